use iced::widget::{column, container, text};
use iced::{Element, Length};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Stateless window showing a single label
#[derive(Debug, Default)]
struct HelloWorld;

/// The window never produces messages
#[derive(Debug, Clone)]
enum Message {}

impl HelloWorld {
    fn update(&mut self, message: Message) {
        match message {}
    }

    fn view(&self) -> Element<Message> {
        container(column![text("Hello, World!")])
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

fn main() -> iced::Result {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    tracing::info!("starting hello-world");
    iced::application("Hello World", HelloWorld::update, HelloWorld::view).run()
}
