//! The client process: a single `mio::Poll` loop multiplexing stdin, the server socket, and
//! `SIGWINCH`, in the same single-threaded-cooperative shape `ircd::server::Server::run` uses on
//! the listen side (§5). There is exactly one `Session`, one `Scrollback`, and one `Tui` per
//! process (§4: "no multi-server, no multi-tab model" -- one connection at a time).

mod cli;
mod commands;
mod config;
mod render;
mod session;

use std::cell::Cell;
use std::io;
use std::net::ToSocketAddrs;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use mio::{Events, Interest, Poll, Token};
use signal_hook::consts::SIGWINCH;
use signal_hook_mio::v0_8::Signals;

use commands::{Input, LocalCmd};
use irc_tui::{Event as TuiEvent, NetworkEvent, ScrollObserver, Scrollback, SystemEvent, Tui, UiEvent};
use session::Session;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 50100;
const SCROLLBACK_CAPACITY: usize = 2000;
const TICK_INTERVAL: Duration = Duration::from_secs(60);
const POLL_TIMEOUT: Duration = Duration::from_millis(250);

const INPUT_TOKEN: Token = Token(1);
const RESIZE_TOKEN: Token = Token(2);

fn main() {
    env_logger::init();

    let args = cli::parse();
    let config_path = args.config_path.clone().unwrap_or_else(default_config_path);
    let config = config::Config::load(&config_path);

    let mut app = match App::new(args, config) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("Could not start: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = app.run() {
        eprintln!("Fatal error: {err}");
        std::process::exit(1);
    }
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("irc-client.conf")
}

/// Sets a shared flag when the scrollback notifies; the main loop checks it once per tick to
/// drive the status bar, rather than reaching into `Tui` from inside the observer callback.
struct StatusFlag(Rc<Cell<bool>>);

impl ScrollObserver for StatusFlag {
    fn notify(&mut self, _message: &str) {
        self.0.set(true);
    }
}

struct App {
    poll: Poll,
    input: term_input::Input,
    signals: Signals,
    session: Session,
    scrollback: Scrollback,
    tui: Tui,
    config: config::Config,
    default_host: String,
    default_port: u16,
    nickname: Option<String>,
    current_channel: Option<String>,
    connecting: bool,
    status_flag: Rc<Cell<bool>>,
    running: bool,
}

impl App {
    fn new(args: cli::Args, config: config::Config) -> io::Result<App> {
        let poll = Poll::new()?;

        let input = term_input::Input::new();
        input.register(&poll, INPUT_TOKEN)?;

        let mut signals = Signals::new([SIGWINCH])?;
        poll.registry()
            .register(&mut signals, RESIZE_TOKEN, Interest::READABLE)?;

        let tui = Tui::new()?;
        let viewport_height = (tui.height() - 2).max(1) as usize;
        let mut scrollback = Scrollback::new(SCROLLBACK_CAPACITY, viewport_height);

        let status_flag = Rc::new(Cell::new(false));
        scrollback.attach(Box::new(StatusFlag(status_flag.clone())));

        let default_host = args
            .host
            .or_else(|| config.hostname.clone())
            .unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let default_port = args.port.or(config.port).unwrap_or(DEFAULT_PORT);

        Ok(App {
            poll,
            input,
            signals,
            session: Session::new(),
            scrollback,
            tui,
            config,
            default_host,
            default_port,
            nickname: None,
            current_channel: None,
            connecting: false,
            status_flag,
            running: true,
        })
    }

    fn run(&mut self) -> io::Result<()> {
        self.scrollback
            .add("irc-client -- type /HELP for a list of commands".to_owned());
        let host = self.default_host.clone();
        let port = self.default_port;
        self.connect(&host, port);

        let mut events = Events::with_capacity(16);
        let mut last_tick = Instant::now();

        while self.running {
            match self.poll.poll(&mut events, Some(POLL_TIMEOUT)) {
                Ok(()) => {}
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }

            for mio_event in events.iter() {
                match mio_event.token() {
                    INPUT_TOKEN => self.poll_input(),
                    RESIZE_TOKEN => self.poll_resize(),
                    session::SERVER_TOKEN => self.poll_server(mio_event),
                    _ => {}
                }
            }

            if last_tick.elapsed() >= TICK_INTERVAL {
                self.tui.events_mut().push(TuiEvent::System(SystemEvent::Tick));
                last_tick = Instant::now();
            }

            while let Some(event) = self.tui.events_mut().pop() {
                self.handle_event(event);
            }

            if self.session.is_connected() {
                if self.session.flush().is_err() {
                    self.session.disconnect(&self.poll);
                    self.scrollback.add("* Disconnected.".to_owned());
                    self.current_channel = None;
                }
            }

            if self.status_flag.get() {
                self.tui.mark_pending();
            }
            if !self.scrollback.pending() {
                self.tui.clear_pending();
                self.status_flag.set(false);
            }

            let status = match self.session.addr() {
                Some(addr) => format!("irc-client -- {addr}"),
                None => "irc-client -- not connected".to_owned(),
            };
            self.tui.draw(&self.scrollback, &status);
        }

        Ok(())
    }

    fn poll_input(&mut self) {
        match self.input.read_events() {
            Ok(evs) => {
                for ev in evs {
                    if let term_input::Event::Key(key) = ev {
                        self.tui.events_mut().push(TuiEvent::Ui(UiEvent::KeyPress(key)));
                    }
                    // String (paste) and Unknown sequences fall outside this UI's key set.
                }
            }
            Err(err) => log::warn!("stdin read error: {err}"),
        }
    }

    fn poll_resize(&mut self) {
        for _ in self.signals.pending() {}
        self.tui.events_mut().push(TuiEvent::Ui(UiEvent::Resize));
    }

    fn poll_server(&mut self, mio_event: &mio::event::Event) {
        if self.connecting && mio_event.is_writable() {
            self.finish_connect();
        }
        if mio_event.is_readable() {
            match self.session.read_lines() {
                Ok(lines) => {
                    for line in lines {
                        self.tui
                            .events_mut()
                            .push(TuiEvent::Network(NetworkEvent::LineReceived(line)));
                    }
                }
                Err(_) => {
                    self.session.disconnect(&self.poll);
                    self.connecting = false;
                    self.tui
                        .events_mut()
                        .push(TuiEvent::Network(NetworkEvent::Disconnected));
                }
            }
        }
    }

    fn handle_event(&mut self, event: TuiEvent) {
        match event {
            TuiEvent::Ui(UiEvent::KeyPress(key)) => self.handle_key(key),
            TuiEvent::Ui(UiEvent::Resize) => self.tui.resize(),
            TuiEvent::Network(NetworkEvent::LineReceived(line)) => {
                let rendered = render::render_line(&line);
                self.scrollback.add(rendered);
            }
            TuiEvent::Network(NetworkEvent::Connected) => {
                self.scrollback.add("* Connected.".to_owned());
                self.auto_register();
            }
            TuiEvent::Network(NetworkEvent::Disconnected) => {
                self.scrollback.add("* Disconnected.".to_owned());
                self.current_channel = None;
            }
            TuiEvent::System(SystemEvent::Tick) => {}
            TuiEvent::System(SystemEvent::Shutdown) => self.running = false,
        }
    }

    fn handle_key(&mut self, key: term_input::Key) {
        use term_input::{Arrow, Key};
        match key {
            Key::Char('\r') => self.submit_line(),
            Key::Char(c) => self.tui.editor_mut().insert_char(c),
            Key::Backspace => self.tui.editor_mut().backspace(),
            Key::Del => self.tui.editor_mut().delete(),
            Key::Arrow(Arrow::Left) => self.tui.editor_mut().cursor_left(),
            Key::Arrow(Arrow::Right) => self.tui.editor_mut().cursor_right(),
            Key::Arrow(Arrow::Up) => self.tui.editor_mut().history_previous(),
            Key::Arrow(Arrow::Down) => self.tui.editor_mut().history_next(),
            Key::Home | Key::Ctrl('a') => self.tui.editor_mut().home(),
            Key::End | Key::Ctrl('e') => self.tui.editor_mut().end(),
            Key::CtrlArrow(Arrow::Up) => self.scrollback.line_up(),
            Key::CtrlArrow(Arrow::Down) => self.scrollback.line_down(),
            Key::PageUp => self.scrollback.page_up(),
            Key::PageDown => self.scrollback.page_down(),
            Key::Ctrl('c') | Key::Ctrl('q') => self.running = false,
            _ => {}
        }
    }

    fn submit_line(&mut self) {
        let line = self.tui.editor_mut().commit();
        if line.is_empty() {
            return;
        }
        let in_channel = self.current_channel.is_some();
        match commands::parse_input(&line, in_channel) {
            Input::Local(cmd) => self.handle_local(cmd),
            Input::Message(text) => {
                let chan = self.current_channel.clone().unwrap();
                self.send_privmsg(&chan, &text);
            }
            Input::NoChannel => {
                self.scrollback
                    .add("* Not in a channel; use /JOIN or /PRIVMSG".to_owned());
            }
        }
    }

    fn handle_local(&mut self, cmd: LocalCmd) {
        match cmd {
            LocalCmd::Connect { host, port } => {
                let host = host.unwrap_or_else(|| self.default_host.clone());
                let port = port.unwrap_or(self.default_port);
                self.connect(&host, port);
            }
            LocalCmd::Disconnect { msg } => self.quit_or_disconnect(msg, false),
            LocalCmd::Nick(nick) => {
                if irc_common::validate_nickname(&nick).is_err() {
                    self.scrollback.add(format!("* Invalid nickname: {nick}"));
                } else {
                    self.nickname = Some(nick.clone());
                    self.send_raw(&format!("NICK {nick}"));
                }
            }
            LocalCmd::User { user, host, real } => {
                self.send_raw(&format!("USER {user} {host} * :{real}"));
            }
            LocalCmd::Join(chan) => {
                if irc_common::validate_channel_name(&chan).is_err() {
                    self.scrollback.add(format!("* Invalid channel name: {chan}"));
                } else {
                    self.current_channel = Some(chan.clone());
                    self.send_raw(&format!("JOIN {chan}"));
                }
            }
            LocalCmd::Part { chan, msg } => {
                if self.current_channel.as_deref() == Some(chan.as_str()) {
                    self.current_channel = None;
                }
                let mut line = format!("PART {chan}");
                if let Some(m) = msg {
                    line.push_str(&format!(" :{m}"));
                }
                self.send_raw(&line);
            }
            LocalCmd::Privmsg { target, text } => self.send_privmsg(&target, &text),
            LocalCmd::Whois(nick) => self.send_raw(&format!("WHOIS {nick}")),
            LocalCmd::Quit { msg } => self.quit_or_disconnect(msg, true),
            LocalCmd::Help(topic) => self.show_help(topic),
            LocalCmd::BadParams(verb) => {
                self.scrollback.add(format!("* {verb}: not enough parameters"));
            }
            LocalCmd::Unknown(verb) => self.scrollback.add(format!("* Unknown command: {verb}")),
        }
    }

    fn quit_or_disconnect(&mut self, msg: Option<String>, exit: bool) {
        if self.session.is_connected() {
            let mut line = "QUIT".to_owned();
            if let Some(m) = &msg {
                line.push_str(&format!(" :{m}"));
            }
            self.send_raw(&line);
            let _ = self.session.flush();
            self.session.disconnect(&self.poll);
        }
        self.connecting = false;
        self.current_channel = None;
        self.scrollback.add("* Disconnected.".to_owned());
        if exit {
            self.running = false;
        }
    }

    fn send_privmsg(&mut self, target: &str, text: &str) {
        let nick = self.nickname.as_deref().unwrap_or("me");
        self.scrollback.add(format!("-> *{target}* <{nick}> {text}"));
        self.send_raw(&format!("PRIVMSG {target} :{text}"));
    }

    fn send_raw(&mut self, line: &str) {
        if !self.session.is_connected() {
            self.scrollback.add("* Not connected.".to_owned());
            return;
        }
        self.session.send(line);
    }

    fn connect(&mut self, host: &str, port: u16) {
        if self.session.is_connected() {
            self.session.disconnect(&self.poll);
        }
        let addr = format!("{host}:{port}")
            .to_socket_addrs()
            .ok()
            .and_then(|mut it| it.next());
        match addr {
            Some(addr) => match self.session.connect(&self.poll, addr) {
                Ok(()) => {
                    self.connecting = true;
                    self.scrollback.add(format!("* Connecting to {addr}..."));
                }
                Err(err) => self.scrollback.add(format!("* Could not connect: {err}")),
            },
            None => self
                .scrollback
                .add(format!("* Could not resolve {host}:{port}")),
        }
    }

    fn finish_connect(&mut self) {
        self.connecting = false;
        let result = self.session.take_error();
        match result {
            Ok(None) => {
                self.tui
                    .events_mut()
                    .push(TuiEvent::Network(NetworkEvent::Connected));
            }
            Ok(Some(err)) | Err(err) => {
                self.scrollback.add(format!("* Connection failed: {err}"));
                self.session.disconnect(&self.poll);
            }
        }
    }

    fn auto_register(&mut self) {
        let nick = self.config.nickname.clone().or_else(|| self.nickname.clone());
        let nick = match nick {
            Some(nick) => nick,
            None => return,
        };
        self.nickname = Some(nick.clone());
        let user = self.config.username.clone().unwrap_or_else(|| nick.clone());
        let real = self.config.realname.clone().unwrap_or_else(|| nick.clone());
        self.send_raw(&format!("NICK {nick}"));
        self.send_raw(&format!("USER {user} 0 * :{real}"));
    }

    fn show_help(&mut self, topic: Option<String>) {
        match topic {
            None => {
                for line in commands::HELP_TEXT.lines() {
                    self.scrollback.add(line.to_owned());
                }
            }
            Some(cmd) => {
                let needle = format!("/{}", cmd.to_ascii_uppercase());
                match commands::HELP_TEXT
                    .lines()
                    .find(|line| line.trim_start().starts_with(&needle))
                {
                    Some(line) => self.scrollback.add(line.to_owned()),
                    None => self.scrollback.add(format!("* No help for {cmd}")),
                }
            }
        }
    }
}
