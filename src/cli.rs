//! 命令行参数

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "taskdeck")]
#[command(version)]
#[command(about = "Terminal client for a shared realtime to-do list")]
pub struct Cli {
    /// 覆盖配置中的 store endpoint（如 ws://localhost:9090）
    #[arg(long)]
    pub endpoint: Option<String>,

    /// 使用进程内 store（无网络，演示模式）
    #[arg(long)]
    pub local: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::parse_from(["taskdeck"]);
        assert!(cli.endpoint.is_none());
        assert!(!cli.local);
    }

    #[test]
    fn test_parse_endpoint_override() {
        let cli = Cli::parse_from(["taskdeck", "--endpoint", "ws://10.0.0.1:9090"]);
        assert_eq!(cli.endpoint.as_deref(), Some("ws://10.0.0.1:9090"));
    }

    #[test]
    fn test_parse_local_flag() {
        let cli = Cli::parse_from(["taskdeck", "--local"]);
        assert!(cli.local);
    }
}
