use std::{
    fs::File,
    io::BufReader,
    path::Path,
    process::ExitCode,
};

use anyhow::{bail, Context, Result};
use log::info;

use detlog::{
    db::helpers::parse_local_date, query::window_boundaries, Database, DayReconstructor,
    ReconstructionConfig, RecordStream, RunConfig,
};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let result = match args.get(1).map(String::as_str) {
        Some("reconstruct") if args.len() == 3 => reconstruct(Path::new(&args[2])).await,
        Some("window") if args.len() == 6 => {
            window(Path::new(&args[2]), &args[3], &args[4], &args[5]).await
        }
        _ => {
            eprintln!("usage: detlog reconstruct <run.json>");
            eprintln!("       detlog window <run.json> <date> <instant> <scope>");
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:?}");
            ExitCode::FAILURE
        }
    }
}

async fn reconstruct(config_path: &Path) -> Result<()> {
    let config = RunConfig::load(config_path)?;

    // Open every input up front: an unavailable file fails the run before
    // anything is written.
    let mut sources = Vec::with_capacity(config.input_files.len());
    for path in &config.input_files {
        let file = File::open(path)
            .with_context(|| format!("failed to open input file {}", path.display()))?;
        sources.push(BufReader::new(file));
    }

    let db = Database::new(config.db_path.clone())?;
    let stream = RecordStream::new(sources, config.decoder()?);
    let mut reconstructor = DayReconstructor::new(
        stream,
        config.entity_class,
        config.allow_list.clone(),
        config.start_date,
        config.end_date,
        ReconstructionConfig::default(),
    );

    while let Some(day) = reconstructor.next_day()? {
        let interval_count: usize = day.intervals.values().map(|seq| seq.len()).sum();
        db.replace_day(&day).await?;
        info!(
            "persisted {} {}: {} intervals across {} entities",
            day.entity_class.as_str(),
            day.local_date,
            interval_count,
            day.entity_ids.len()
        );
    }

    Ok(())
}

async fn window(config_path: &Path, date: &str, instant: &str, scope: &str) -> Result<()> {
    let config = RunConfig::load(config_path)?;
    let date = parse_local_date(date)?;
    let instant: f64 = instant
        .parse()
        .with_context(|| format!("invalid instant '{instant}'"))?;
    let scope: f64 = scope
        .parse()
        .with_context(|| format!("invalid scope '{scope}'"))?;

    let db = Database::new(config.db_path.clone())?;
    let Some(day) = db.load_day(config.entity_class, date).await? else {
        bail!(
            "no persisted {} day for {date}; run reconstruct first",
            config.entity_class.as_str()
        );
    };

    let boundaries = window_boundaries(&day, instant, scope, &config.allow_list);
    println!("{}", serde_json::to_string_pretty(&boundaries)?);

    Ok(())
}
