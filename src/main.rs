use iced::widget::{button, column, container, image, text, Column};
use iced::{window, Alignment, Element, Length, Subscription, Task, Theme};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod error;
mod state;
mod upload;

use config::{StorageConfig, IMAGE_EXTENSIONS};
use state::app::{Controller, Effect, Message};

/// Main application window
struct ImageUpload {
    controller: Controller,
}

impl ImageUpload {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let controller = Controller::new(StorageConfig::detect());
        (ImageUpload { controller }, Task::none())
    }

    /// Forward the message to the controller and run whatever it asks for
    fn update(&mut self, message: Message) -> Task<Message> {
        match self.controller.update(message) {
            Effect::None => Task::none(),
            Effect::PickFile => Task::perform(pick_image_file(), Message::FileSelected),
            Effect::Upload(request) => {
                Task::perform(upload::upload_image(request), Message::UploadFinished)
            }
            Effect::Exit => iced::exit(),
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let upload_button = button("Upload Image")
            .on_press_maybe(self.controller.can_upload().then_some(Message::Upload))
            .padding(10);

        let mut content: Column<Message> = column![
            button("Select Image")
                .on_press(Message::SelectImage)
                .padding(10),
            upload_button,
            text(self.controller.status()).size(16),
        ]
        .spacing(20)
        .padding(20)
        .align_x(Alignment::Center);

        if let Some(path) = self.controller.displayed_image() {
            // A fresh handle per display file makes the widget load it again
            content = content.push(
                image(image::Handle::from_path(path))
                    .width(Length::Fill)
                    .height(Length::Fill),
            );
        }

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .into()
    }

    /// Close requests go through the controller so the database is closed first
    fn subscription(&self) -> Subscription<Message> {
        window::close_requests().map(|_| Message::Shutdown)
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Show the native file picker restricted to image files
async fn pick_image_file() -> Option<PathBuf> {
    rfd::AsyncFileDialog::new()
        .set_title("Select Image")
        .add_filter("Image files", &IMAGE_EXTENSIONS[..])
        .pick_file()
        .await
        .map(|handle| handle.path().to_path_buf())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

fn main() -> iced::Result {
    init_tracing();

    iced::application("Image Upload", ImageUpload::update, ImageUpload::view)
        .subscription(ImageUpload::subscription)
        .theme(ImageUpload::theme)
        .exit_on_close_request(false)
        .centered()
        .run_with(ImageUpload::new)
}
