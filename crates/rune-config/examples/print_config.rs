/// Example program to print the loaded configuration
///
/// Run with: cargo run -p rune-config --example print_config

fn main() {
    // Load configuration from rune.toml
    let config = rune_config::RuneConfig::load();

    println!("=== Rune Configuration ===\n");

    println!("Motion Settings:");
    println!("  Eviction Grace: {}ms", config.motion.eviction_grace_ms);
    println!("  Default Duration: {}", config.motion.default_duration);
    println!("  Timing Function: {}", config.motion.timing_function);
    println!("  Visible When Announced: {}", config.motion.visible_when_announced);
    println!("  Settle Delay: {}ms", config.motion.settle_delay_ms);
}
