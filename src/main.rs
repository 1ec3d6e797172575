mod app;
mod cli;
mod config;
mod error;
mod event;
mod model;
mod store;
mod sync;
mod theme;
mod ui;

use std::io;
use std::panic;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use ratatui::DefaultTerminal;

use app::App;
use cli::Cli;
use store::memory::MemoryStore;
use store::remote::RemoteStore;
use store::TaskStore;
use theme::Theme;

fn main() -> ExitCode {
    // Set up panic hook to restore terminal state on panic
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    let cli = Cli::parse();
    let cfg = config::load_config();

    // 构造 store 客户端（整个应用生命周期只构造一次）
    let store: Arc<dyn TaskStore> = if cli.local {
        Arc::new(MemoryStore::new())
    } else {
        let endpoint = cli.endpoint.as_deref().unwrap_or(&cfg.store.endpoint);
        match RemoteStore::connect(endpoint, &cfg.store.collection) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                eprintln!("Cannot reach task store at {}: {}", endpoint, e.user_message());
                return ExitCode::FAILURE;
            }
        }
    };

    let theme = Theme::from_name(&cfg.theme.name);

    // 初始化终端并运行主循环
    let mut terminal = ratatui::init();
    let mut app = App::new(store, theme);
    let result = run(&mut terminal, &mut app);
    ratatui::restore();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Terminal error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(terminal: &mut DefaultTerminal, app: &mut App) -> io::Result<()> {
    loop {
        // 渲染界面
        terminal.draw(|frame| ui::screen::render(frame, app))?;

        // 处理事件（内部先收快照和 outcome）
        if !event::handle_events(app)? {
            break;
        }
    }

    Ok(())
}
