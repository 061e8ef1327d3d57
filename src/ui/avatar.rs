/// Picture-card avatar button plus the toast stack
use iced::widget::{button, column, container, image, text, Column};
use iced::{Alignment, Element, Length};

use crate::state::notifications::{Toast, ToastLevel};
use crate::state::uploader::UploadState;
use crate::Message;

/// Side of the square picture card
const CARD_SIZE: f32 = 104.0;

pub fn view<'a>(
    state: &'a UploadState,
    preview: Option<&'a image::Handle>,
    toasts: &[Toast],
) -> Element<'a, Message> {
    let card: Element<Message> = match preview {
        Some(handle) => image(handle.clone())
            .width(Length::Fixed(CARD_SIZE))
            .height(Length::Fixed(CARD_SIZE))
            .into(),
        None => placeholder(state.loading),
    };

    let uploader = button(
        container(card)
            .width(Length::Fixed(CARD_SIZE))
            .height(Length::Fixed(CARD_SIZE))
            .center_x(Length::Fixed(CARD_SIZE))
            .center_y(Length::Fixed(CARD_SIZE)),
    )
    .style(button::secondary)
    .padding(4);

    // Picking is disabled while a file is in flight
    let uploader = if state.loading {
        uploader
    } else {
        uploader.on_press(Message::PickFile)
    };

    column![uploader, toast_stack(toasts)]
        .spacing(20)
        .align_x(Alignment::Center)
        .into()
}

/// "+" / "Loading" icon above the "Upload" caption
fn placeholder<'a>(loading: bool) -> Element<'a, Message> {
    let icon = if loading { "Loading…" } else { "+" };
    column![text(icon).size(24), text("Upload").size(14)]
        .spacing(6)
        .align_x(Alignment::Center)
        .into()
}

fn toast_stack<'a>(toasts: &[Toast]) -> Element<'a, Message> {
    let mut stack = Column::new().spacing(8).align_x(Alignment::Center);
    for toast in toasts {
        let line = text(toast.message.clone()).size(14);
        let line = match toast.level {
            ToastLevel::Error => line.style(text::danger),
            ToastLevel::Info => line.style(text::success),
        };
        stack = stack.push(line);
    }
    stack.into()
}
