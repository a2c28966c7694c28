pub mod agents;
pub mod cards;
pub mod device;
pub mod env;
pub mod table;

/// expected values, rewards, and regrets
pub type Utility = f32;
/// strategy weights and sampling distributions
pub type Probability = f32;
/// seat index identifying which agent controls which player slot
pub type Position = usize;

/// floor for cumulative regret storage (prevents unbounded negative growth)
pub const REGRET_MIN: Utility = -3e5;
/// minimum policy weight to prevent division by zero in normalization
pub const POLICY_MIN: Probability = Probability::MIN_POSITIVE;
/// trajectories collected per training epoch, parallelized across threads
pub const CFR_BATCH_SIZE: usize = 32;
/// epochs between training progress lines
pub const TRAINING_LOG_INTERVAL: usize = 1000;
/// episodes between tournament progress lines
pub const TOURNAMENT_LOG_INTERVAL: usize = 1000;

/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}
