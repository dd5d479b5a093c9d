use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::env;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use skyburst::color;
use skyburst::terminal::Presenter;
use skyburst::{Config, Controller, Error, Result};

/// Poll interval while the show is switched off
const IDLE_POLL: Duration = Duration::from_millis(50);

fn print_usage() {
    eprintln!("skyburst - fireworks in the terminal");
    eprintln!();
    eprintln!("Usage: skyburst [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config PATH      Load show tuning from a JSON file");
    eprintln!("  --seed N           Replay a show from a fixed seed");
    eprintln!("  --bg-color RRGGBB  Set background color as hex (e.g., --bg-color 1a1b26)");
    eprintln!("  --log-file PATH    Write logs to PATH (filter with RUST_LOG)");
    eprintln!();
    eprintln!("Keys: space toggles the show, 'q', ESC, or Ctrl+C exits");
}

#[derive(Debug, Default)]
struct Options {
    config: Option<PathBuf>,
    seed: Option<u64>,
    bg_color: Option<color::Rgb>,
    log_file: Option<PathBuf>,
}

/// `Ok(None)` means help was requested.
fn parse_args(args: &[String]) -> Result<Option<Options>> {
    let mut options = Options::default();

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        if matches!(flag, "help" | "--help" | "-h") {
            return Ok(None);
        }
        if !matches!(flag, "--config" | "--seed" | "--bg-color" | "--log-file") {
            return Err(Error::InvalidArgument(format!("unknown option: {flag}")));
        }
        let value = args
            .get(i + 1)
            .ok_or_else(|| Error::InvalidArgument(format!("{flag} requires a value")))?;
        match flag {
            "--config" => options.config = Some(PathBuf::from(value)),
            "--seed" => {
                let seed = value
                    .parse()
                    .map_err(|_| Error::InvalidArgument(format!("invalid seed: {value}")))?;
                options.seed = Some(seed);
            }
            "--bg-color" => {
                let color = color::parse_hex(value).ok_or_else(|| {
                    Error::InvalidArgument(format!(
                        "invalid hex color: {value}\nExpected format: RRGGBB (e.g., 1a1b26)"
                    ))
                })?;
                options.bg_color = Some(color);
            }
            "--log-file" => options.log_file = Some(PathBuf::from(value)),
            other => return Err(Error::InvalidArgument(format!("unknown option: {other}"))),
        }
        i += 2;
    }

    Ok(Some(options))
}

fn build_config(options: &Options) -> Result<Config> {
    let mut config = match &options.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(seed) = options.seed {
        config.seed = Some(seed);
    }
    if let Some(bg) = options.bg_color {
        config.render.background = bg;
        config.render.fade_color = bg;
    }
    Ok(config)
}

/// stderr shares the screen with the show, so logs only go there at warn
/// and above unless a log file is given.
fn init_logger(log_file: Option<&PathBuf>) -> Result<()> {
    let default_level = if log_file.is_some() { "info" } else { "warn" };
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));
    if let Some(path) = log_file {
        let file = File::create(path).map_err(|source| Error::LogFile {
            path: path.clone(),
            source,
        })?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn is_quit(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('q')
        || key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

fn surface_size() -> Result<(usize, usize)> {
    let (cols, rows) = terminal::size()?;
    Ok((cols as usize, rows as usize * 2))
}

fn show_loop<W: Write>(out: &mut W, config: Config) -> Result<()> {
    let fixed_dt = 1.0 / config.ticks_per_second as f32;
    let mut controller = Controller::new(config);
    let mut presenter = Presenter::new();

    let mut size = surface_size()?;
    controller.set_active(true, size.0, size.1);

    let mut last_frame = Instant::now();
    let mut accumulator = 0.0f32;

    loop {
        let poll = if controller.is_active() { Duration::from_millis(1) } else { IDLE_POLL };
        if event::poll(poll)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if is_quit(&key) {
                        break;
                    }
                    if key.code == KeyCode::Char(' ') {
                        let active = !controller.is_active();
                        controller.set_active(active, size.0, size.1);
                        if !active {
                            execute!(out, Clear(ClearType::All))?;
                        }
                    }
                }
                Event::Resize(cols, rows) => {
                    size = (cols as usize, rows as usize * 2);
                    execute!(out, Clear(ClearType::All))?;
                    if controller.is_active() {
                        controller.activate(size.0, size.1);
                    }
                }
                _ => {}
            }
        }

        let now = Instant::now();
        accumulator += now.duration_since(last_frame).as_secs_f32();
        last_frame = now;
        if accumulator > fixed_dt * 3.0 {
            accumulator = fixed_dt * 3.0;
        }

        let mut stepped = false;
        while accumulator >= fixed_dt {
            stepped |= controller.tick();
            accumulator -= fixed_dt;
        }

        if stepped {
            if let Some(surface) = controller.surface() {
                presenter.present(surface, out)?;
            }
        }
    }

    controller.deactivate();
    Ok(())
}

fn run(config: Config) -> Result<()> {
    let mut stdout = BufWriter::with_capacity(1024 * 64, stdout());

    terminal::enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All))?;

    let result = show_loop(&mut stdout, config);

    // Restore the terminal even when the loop failed
    let restored = restore_terminal(&mut stdout, terminal::disable_raw_mode);

    result.and(restored)
}

/// Leave the alternate screen and raw mode. Both steps always run; the first
/// failure is reported.
fn restore_terminal<W: Write>(out: &mut W, disable_raw: impl FnOnce() -> std::io::Result<()>) -> Result<()> {
    let screen = execute!(out, Show, LeaveAlternateScreen);
    let raw = disable_raw();
    screen?;
    raw?;
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let result = parse_args(&args).and_then(|options| {
        let Some(options) = options else {
            print_usage();
            return Ok(());
        };
        init_logger(options.log_file.as_ref())?;
        let config = build_config(&options)?;
        log::info!("skyburst starting");
        run(config)
    });

    if let Err(e) = result {
        eprintln!("{e}");
        if matches!(e, Error::InvalidArgument(_)) {
            eprintln!();
            print_usage();
        }
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("skyburst").chain(list.iter().copied()).map(String::from).collect()
    }

    #[test]
    fn test_parse_all_options() {
        let options = parse_args(&args(&["--seed", "42", "--bg-color", "1a1b26", "--config", "show.json"]))
            .unwrap()
            .unwrap();
        assert_eq!(options.seed, Some(42));
        assert_eq!(options.bg_color, Some((0x1a, 0x1b, 0x26)));
        assert_eq!(options.config, Some(PathBuf::from("show.json")));
    }

    #[test]
    fn test_help() {
        assert!(parse_args(&args(&["--help"])).unwrap().is_none());
    }

    #[test]
    fn test_bad_arguments() {
        assert!(matches!(parse_args(&args(&["--seed"])), Err(Error::InvalidArgument(_))));
        assert!(matches!(parse_args(&args(&["--seed", "x"])), Err(Error::InvalidArgument(_))));
        assert!(matches!(parse_args(&args(&["--bg-color", "fff"])), Err(Error::InvalidArgument(_))));
        assert!(matches!(parse_args(&args(&["--wat"])), Err(Error::InvalidArgument(m)) if m.contains("unknown")));
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }
    }

    #[test]
    fn test_restore_disables_raw_mode_after_screen_error() {
        let mut raw_disabled = false;
        let result = restore_terminal(&mut BrokenPipe, || {
            raw_disabled = true;
            Ok(())
        });
        assert!(raw_disabled);
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_restore_reports_raw_mode_error() {
        let mut sink = Vec::new();
        let result = restore_terminal(&mut sink, || Err(std::io::ErrorKind::Other.into()));
        assert!(matches!(result, Err(Error::Io(_))));
        assert!(!sink.is_empty());
    }

    #[test]
    fn test_bg_color_sets_fade() {
        let options = Options {
            bg_color: Some((5, 6, 7)),
            seed: Some(1),
            ..Options::default()
        };
        let config = build_config(&options).unwrap();
        assert_eq!(config.render.background, (5, 6, 7));
        assert_eq!(config.render.fade_color, (5, 6, 7));
        assert_eq!(config.seed, Some(1));
    }
}
