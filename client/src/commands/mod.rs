// Commands Layer - 终端命令
//
// 把一行输入解析为命令并在 ChatClient 上执行

use crate::app::ChatClient;
use crate::modules::chat::application::SendOutcome;
use crate::modules::chat::ports::PersonaProvider;
use crate::shared::AppResult;

/// 一行输入对应的命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    /// 普通文本，作为消息发送
    Send(String),
    /// `/theme`
    ToggleTheme,
    /// `/personas`
    ListPersonas,
    /// `/persona <id>`
    SelectPersona(String),
    /// `/status`
    Status,
    /// `/quit`
    Quit,
    /// 无法识别的斜杠命令
    Unknown(String),
}

impl InputCommand {
    /// 解析一行输入，空行返回 None
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        if !trimmed.starts_with('/') {
            return Some(InputCommand::Send(trimmed.to_string()));
        }

        let mut parts = trimmed.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::trim).unwrap_or_default();

        let command = match (name, arg) {
            ("/theme", _) => InputCommand::ToggleTheme,
            ("/personas", _) => InputCommand::ListPersonas,
            ("/persona", "") => InputCommand::ListPersonas,
            ("/persona", id) => InputCommand::SelectPersona(id.to_string()),
            ("/status", _) => InputCommand::Status,
            ("/quit", _) | ("/exit", _) => InputCommand::Quit,
            _ => InputCommand::Unknown(name.to_string()),
        };
        Some(command)
    }

    /// 执行命令，返回需要额外输出的文本
    ///
    /// 消息与主题的显示由渲染器负责，这里只返回列表与状态等说明文本
    pub async fn execute(&self, client: &ChatClient) -> AppResult<Option<String>> {
        match self {
            InputCommand::Send(text) => {
                if let SendOutcome::Ignored(reason) = client.send_message(text).await {
                    tracing::debug!("[Commands] Input ignored: {:?}", reason);
                }
                Ok(None)
            }
            InputCommand::ToggleTheme => {
                client.theme().toggle().await?;
                Ok(None)
            }
            InputCommand::ListPersonas => Ok(Some(persona_list(client).await)),
            InputCommand::SelectPersona(id) => {
                client.personas().select(id).await?;
                let label = client
                    .personas()
                    .current()
                    .await
                    .map(|p| p.display_label())
                    .unwrap_or_else(|| id.clone());
                Ok(Some(format!("已切换人格：{}", label)))
            }
            InputCommand::Status => Ok(Some(status_line(client))),
            InputCommand::Quit => Ok(None),
            InputCommand::Unknown(name) => Ok(Some(format!(
                "未知命令 {}，可用：/theme /personas /persona <id> /status /quit",
                name
            ))),
        }
    }
}

async fn persona_list(client: &ChatClient) -> String {
    let personas = client.personas().personas().await;
    if personas.is_empty() {
        return "暂无可用人格".to_string();
    }

    let current = client.personas().current_persona_id().await;
    personas
        .iter()
        .map(|p| {
            let marker = if p.id == current { "*" } else { " " };
            format!("{} {} ({})", marker, p.display_label(), p.id)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn status_line(client: &ChatClient) -> String {
    let conversation = client.conversation();
    format!(
        "会话 {} · 消息 {} · {}",
        client.session_id(),
        conversation.message_count(),
        if client.channel().is_connected() {
            "在线"
        } else {
            "离线"
        }
    )
}
