// src/main.rs
use log::info;
use pillarbook::config::AppConfig;
use pillarbook::feed::{Feed, LogSink};
use pillarbook::pcap::CaptureReader;
use std::path::{Path, PathBuf};

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("usage: pillarbook <capture.pcap> [config.toml]");
        std::process::exit(2);
    }
    let capture_path = PathBuf::from(&args[1]);

    // Load config before the logger to allow JSON formatting choice. An
    // explicitly named config must exist; the default path is optional.
    let cfg = match args.get(2) {
        Some(p) => AppConfig::from_file(Path::new(p))?,
        None => {
            let default = Path::new("config.toml");
            if default.exists() {
                AppConfig::from_file(default)?
            } else {
                AppConfig::default()
            }
        }
    };

    if cfg.general.json_logs {
        let mut b =
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
        b.format(|buf, record| {
            use std::io::Write;
            let ts = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
            writeln!(
                buf,
                "{{\"ts\":\"{}\",\"level\":\"{}\",\"target\":\"{}\",\"msg\":\"{}\"}}",
                ts,
                record.level(),
                record.target(),
                record.args().to_string().replace('"', "'")
            )
        })
        .init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    info!("replaying {}", capture_path.display());

    let mut reader = CaptureReader::open(&capture_path)?;
    let mut feed = Feed::new();
    feed.set_snapshot_depth(cfg.snapshot.depth);
    let mut sink = LogSink {
        print_snapshots: cfg.snapshot.print,
    };
    while let Some(rec) = reader.next_record() {
        feed.apply_frame(rec.data, &mut sink);
    }
    feed.log_summary();
    Ok(())
}
