use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use warmchat_lib::modules::chat::infrastructure::TerminalRenderer;
use warmchat_lib::modules::config::ConfigLoader;
use warmchat_lib::{init_tracing, AppResult, ChatClient, InputCommand};

#[tokio::main]
async fn main() -> AppResult<()> {
    init_tracing();

    tracing::info!("Warmchat starting...");

    let loader = ConfigLoader::from_env();
    let config = loader.load().await?;
    tracing::info!("Backend: {}", config.base_url);

    let renderer = Arc::new(TerminalRenderer::new());
    let client = Arc::new(ChatClient::bootstrap(config, renderer).await?);
    client.start().await?;

    println!("会话 {}，输入消息开始聊天，/quit 退出", client.session_id());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(command) = InputCommand::parse(&line) else {
            continue;
        };
        if command == InputCommand::Quit {
            break;
        }

        // 发送在独立任务中进行，读取输入与推送显示不受影响
        let client = client.clone();
        tokio::spawn(async move {
            match command.execute(&client).await {
                Ok(Some(text)) => println!("{}", text),
                Ok(None) => {}
                Err(e) => eprintln!("{}", e),
            }
        });
    }

    client.shutdown().await;
    Ok(())
}
