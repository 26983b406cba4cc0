//! User interface utilities for better console output

use std::fmt;
use std::time::Duration;

/// ANSI color codes for terminal output
pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";

    pub const BRIGHT_RED: &str = "\x1b[91m";
    pub const BRIGHT_GREEN: &str = "\x1b[92m";
    pub const BRIGHT_YELLOW: &str = "\x1b[93m";
    pub const BRIGHT_CYAN: &str = "\x1b[96m";
    pub const BRIGHT_WHITE: &str = "\x1b[97m";
}

/// Print startup banner
pub fn print_banner(version: &str) {
    println!();
    println!("{}╔══════════════════════════════════════════════════════════════╗{}", colors::BRIGHT_CYAN, colors::RESET);
    println!("{}║{}          {}JIO NODE - JIOPAD v{:<10}{}                          {}║{}",
        colors::BRIGHT_CYAN, colors::RESET, colors::BOLD, version, colors::RESET, colors::BRIGHT_CYAN, colors::RESET);
    println!("{}║{}          Mining & staking control surface                    {}║{}",
        colors::BRIGHT_CYAN, colors::RESET, colors::BRIGHT_CYAN, colors::RESET);
    println!("{}╚══════════════════════════════════════════════════════════════╝{}", colors::BRIGHT_CYAN, colors::RESET);
    println!();
}

/// Print status line with icon and color
pub fn print_status(icon: &str, message: &str, status: StatusType) {
    let color = match status {
        StatusType::Success => colors::BRIGHT_GREEN,
        StatusType::Info => colors::BRIGHT_CYAN,
        StatusType::Warning => colors::BRIGHT_YELLOW,
        StatusType::Error => colors::BRIGHT_RED,
    };

    println!("{}[{}]{} {} {}{}", color, icon, colors::RESET, color, message, colors::RESET);
}

/// Status types for colored output
#[derive(Debug, Clone, Copy)]
pub enum StatusType {
    Success,
    Info,
    Warning,
    Error,
}

/// Print a section header
pub fn print_section(title: &str) {
    println!();
    println!("{}━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━{}", colors::DIM, colors::RESET);
    println!("{}  {}{}{}", colors::BRIGHT_CYAN, colors::BOLD, title, colors::RESET);
    println!("{}━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━{}", colors::DIM, colors::RESET);
    println!();
}

/// Print key-value pair in a formatted way
pub fn print_kv(key: &str, value: &str) {
    println!("  {}{}:{}{} {}{}{}",
        colors::BRIGHT_WHITE, key, colors::RESET, colors::DIM,
        colors::BRIGHT_CYAN, value, colors::RESET);
}

/// Print configuration summary
pub fn print_config_summary(config: &crate::config::Config) {
    print_section("Configuration");

    print_kv("Wallet Directory", &config.wallet.wallet_dir.display().to_string());
    let rpc_status = if config.rpc.enabled {
        format!("{}:{}", config.rpc.bind_address, config.rpc.port)
    } else {
        "Disabled".to_string()
    };
    print_kv("RPC Server", &rpc_status);
    print_kv("Mining Workers", &config.mining.num_workers.to_string());
    print_kv("Mining Bits", &format!("{:#010x}", config.mining.bits));
    print_kv("Mining Wallet", config.mining.wallet.as_deref().unwrap_or("first by name"));
    print_kv("Staking", if config.staking.enabled { "Enabled" } else { "Disabled" });
    if config.staking.enabled {
        print_kv("Stake Interval", &format!("{}ms", config.staking.search_interval_ms));
        print_kv("Stake Weight", &config.staking.weight.to_string());
    }
}

/// Print component status
pub fn print_component_status(component: &str, status: ComponentStatus) {
    let (icon, color, text) = match status {
        ComponentStatus::Starting => ("⏳", colors::BRIGHT_YELLOW, "Starting"),
        ComponentStatus::Running => ("✓", colors::BRIGHT_GREEN, "Running"),
        ComponentStatus::Stopped => ("✗", colors::BRIGHT_RED, "Stopped"),
    };

    println!("  {}[{}]{} {:<20} {}", color, icon, colors::RESET, component, text);
}

#[derive(Debug, Clone, Copy)]
pub enum ComponentStatus {
    Starting,
    Running,
    Stopped,
}

/// Format duration as human-readable string
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        let hours = secs / 3600;
        let minutes = (secs % 3600) / 60;
        let seconds = secs % 60;
        format!("{}h {}m {}s", hours, minutes, seconds)
    }
}

/// Format hashrate as human-readable string
pub fn format_hashrate(hashrate: f64) -> String {
    if hashrate >= 1e12 {
        format!("{:.2} TH/s", hashrate / 1e12)
    } else if hashrate >= 1e9 {
        format!("{:.2} GH/s", hashrate / 1e9)
    } else if hashrate >= 1e6 {
        format!("{:.2} MH/s", hashrate / 1e6)
    } else if hashrate >= 1e3 {
        format!("{:.2} KH/s", hashrate / 1e3)
    } else {
        format!("{:.2} H/s", hashrate)
    }
}

/// Node status summary
pub struct NodeStatus {
    pub uptime: Duration,
    pub height: u64,
    pub pow_blocks: u64,
    pub pos_blocks: u64,
    pub wallets: usize,
    pub mining_hashrate: f64,
    pub stakers: u64,
    pub staking: bool,
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━{}", colors::DIM, colors::RESET)?;
        writeln!(f, "{}  Node Status Summary{}", colors::BRIGHT_CYAN, colors::RESET)?;
        writeln!(f, "{}━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━{}", colors::DIM, colors::RESET)?;
        writeln!(f)?;
        writeln!(f, "  {}Uptime:{}           {}", colors::BRIGHT_WHITE, colors::RESET, format_duration(self.uptime))?;
        writeln!(f, "  {}Height:{}           {} ({} PoW, {} PoS)", colors::BRIGHT_WHITE, colors::RESET, self.height, self.pow_blocks, self.pos_blocks)?;
        writeln!(f, "  {}Wallets:{}          {}", colors::BRIGHT_WHITE, colors::RESET, self.wallets)?;
        writeln!(f, "  {}Last hashrate:{}    {}", colors::BRIGHT_WHITE, colors::RESET, format_hashrate(self.mining_hashrate))?;

        if self.staking {
            writeln!(f, "  {}Staking:{}          {}{} staker(s){}",
                colors::BRIGHT_WHITE, colors::RESET,
                colors::BRIGHT_GREEN, self.stakers, colors::RESET)?;
        } else {
            writeln!(f, "  {}Staking:{}          {}Idle{}",
                colors::BRIGHT_WHITE, colors::RESET,
                colors::DIM, colors::RESET)?;
        }

        writeln!(f)
    }
}
