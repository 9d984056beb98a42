use std::path::PathBuf;
use std::time::Duration;

use logsinks::{
    InclusionMap, LogReader, LogWriterConfig, MessageProperties, TimeSlicedFilesLogConfig,
    TimeSlicedFilesLogReader, logger_config,
};

fn main() {
    let dir = PathBuf::from("/tmp/logsinks_example_time_sliced");
    let _ = std::fs::remove_dir_all(&dir);

    let config = TimeSlicedFilesLogConfig::new(
        LogWriterConfig::new(InclusionMap::all(), MessageProperties::serialization_only()),
        &dir,
        "app",
        Duration::from_secs(15 * 60),
        true,
    )
    .unwrap();

    let dispatcher = logger_config()
        .with_stdout()
        .with_time_sliced_files(config.clone())
        .unwrap()
        .init_global()
        .unwrap();
    println!("{}", dispatcher.description());

    for i in 0..20 {
        log::info!("Log message number {i}");
    }
    log::error!("Something went wrong");

    let items = TimeSlicedFilesLogReader::new(config).read_all().unwrap();
    let files: Vec<String> = std::fs::read_dir(&dir)
        .unwrap()
        .flatten()
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();

    println!("\n--- Time-sliced Summary ---");
    println!("Log directory: {}", dir.display());
    for f in &files {
        println!("  {f}");
    }
    println!("Items read back: {}", items.len());
    assert_eq!(items.len(), 21);
}
