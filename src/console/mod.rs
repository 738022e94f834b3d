//! Line-oriented front-end: turns stdin lines into session commands and prints
//! whatever the session appended since the last look.

use log::info;
use std::error::Error;
use tokio::io::{ AsyncBufRead, AsyncBufReadExt, BufReader };

use crate::media::{ FileEntry, PreviewState, Visibility };
use crate::models::chat::{ ChatMessage, Origin };
use crate::session::{ Command, PhotoSource, Screen, Session };

pub const HELP: &str =
    "命令：
  /awaken          唤醒地灵，进入对话
  /back            返回首页
  /capture         拍一张照片
  /open <路径>...  选择图片文件
  /use             使用这张照片
  /retake          重新拍摄
  /weather         感受此地的天气
  /mood <文字>     让地灵感受你的心情
  /hide, /show     暂停或恢复摄像头画面
  /status          查看当前状态
  /help            显示帮助
  /quit            离开
其他输入会作为消息发送给地灵。";

#[derive(Debug, Clone)]
pub enum Input {
    Command(Command),
    Status,
    Help,
    Quit,
    Empty,
}

pub fn parse_line(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    if !line.starts_with('/') {
        return Input::Command(Command::SendMessage(line.to_string()));
    }

    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    match name {
        "/awaken" => Input::Command(Command::Awaken),
        "/back" => Input::Command(Command::Back),
        "/capture" => Input::Command(Command::Capture),
        "/open" => {
            let files = rest.split_whitespace().map(FileEntry::from_path).collect();
            Input::Command(Command::SelectFiles(files))
        }
        "/use" => Input::Command(Command::UsePhoto),
        "/retake" => Input::Command(Command::Retake),
        "/weather" => Input::Command(Command::AskWeather),
        "/mood" => Input::Command(Command::SenseMood(rest.to_string())),
        "/hide" => Input::Command(Command::VisibilityChanged(Visibility::Hidden)),
        "/show" => Input::Command(Command::VisibilityChanged(Visibility::Visible)),
        "/status" => Input::Status,
        "/quit" | "/exit" => Input::Quit,
        _ => Input::Help,
    }
}

pub fn render_message(message: &ChatMessage) -> String {
    let speaker = match message.origin {
        Origin::User => "你",
        Origin::Spirit => "地灵",
    };
    let time = message.timestamp.format("%H:%M");
    match (&message.image, message.text.is_empty()) {
        (Some(image), true) => format!("[{}] {}: [图片 {}]", time, speaker, image.mime()),
        (Some(image), false) => format!("[{}] {}: [图片 {}] {}", time, speaker, image.mime(), message.text),
        (None, _) => format!("[{}] {}: {}", time, speaker, message.text),
    }
}

pub fn render_status(session: &Session) -> String {
    let screen = match session.screen() {
        Screen::Home => "首页",
        Screen::Chat => "对话",
    };
    let gateway = if session.gateway().is_available() { "在线" } else { "离线" };
    let camera = match session.media().preview() {
        PreviewState::Live => "已开启",
        PreviewState::Placeholder => "未开启",
    };
    let staged = match session.staged_photo().map(|p| &p.source) {
        Some(PhotoSource::Camera) => "拍摄的照片".to_string(),
        Some(PhotoSource::File(name)) => name.clone(),
        None => "无".to_string(),
    };
    let position = session
        .position()
        .map(|p| format!("{:.4}, {:.4}", p.latitude, p.longitude))
        .unwrap_or_else(|| "未知".to_string());

    format!(
        "界面：{}  地灵：{}  摄像头：{}  待用照片：{}  位置：{}  消息数：{}",
        screen,
        gateway,
        camera,
        staged,
        position,
        session.transcript().len()
    )
}

pub struct Console {
    session: Session,
    rendered: usize,
    staged: bool,
}

impl Console {
    pub fn new(session: Session) -> Self {
        Self { session, rendered: 0, staged: false }
    }

    pub async fn run(mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.session.start().await;
        println!("{}", HELP);
        self.flush();

        self.read_lines(BufReader::new(tokio::io::stdin())).await?;

        info!("Leaving session");
        self.session.teardown();
        Ok(())
    }

    /// Feeds `reader` into the session until `/quit` or end of input. At end of
    /// input every reply still pending is awaited and printed.
    pub async fn read_lines<R>(&mut self, reader: R) -> Result<(), Box<dyn Error + Send + Sync>>
        where R: AsyncBufRead + Unpin
    {
        let mut lines = reader.lines();
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let line = match line? {
                        Some(line) => line,
                        None => {
                            self.session.settle().await;
                            self.flush();
                            break;
                        }
                    };
                    if !self.handle(&line) {
                        break;
                    }
                }
                _ = self.session.next_completion(), if self.session.has_pending() => {}
            }
            self.flush();
        }
        Ok(())
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn handle(&mut self, line: &str) -> bool {
        match parse_line(line) {
            Input::Command(command) => self.session.dispatch(command),
            Input::Status => println!("{}", render_status(&self.session)),
            Input::Help => println!("{}", HELP),
            Input::Quit => {
                return false;
            }
            Input::Empty => {}
        }
        true
    }

    fn flush(&mut self) {
        for notice in self.session.take_notices() {
            println!("※ {}", notice);
        }
        for message in self.session.transcript().since(self.rendered) {
            println!("{}", render_message(message));
        }
        self.rendered = self.session.transcript().len();

        let staged = self.session.staged_photo().is_some();
        if staged && !self.staged {
            println!("照片已准备好：/use 使用，/retake 重拍");
        }
        self.staged = staged;
    }
}
