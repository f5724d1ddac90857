use iced::widget::{
    button, center, column, container, image, mouse_area, opaque, row, scrollable, stack, text,
    text_input, Column,
};
use iced::{Alignment, Color, Element, Length, Task, Theme};
use iced_aw::Wrap;
use rfd::FileDialog;
use std::collections::HashMap;

// Declare the modules
mod api;
mod error;
mod preview;
mod state;

use api::client::VaultClient;
use state::data::{parse_labels, PendingFile, VaultImage};
use state::gallery::GalleryState;
use state::search::{self, SearchOutcome, SearchState};
use state::upload::{self, UploadOutcome, UploadState};

/// The two top-level tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Upload,
    Search,
}

/// Main application state
struct ImageVault {
    /// HTTP client for the vault service
    client: VaultClient,
    /// Which tab is showing
    active_tab: Tab,
    /// Upload coordinator
    upload: UploadState,
    /// Search coordinator
    search: SearchState,
    /// Transient gallery interaction state
    gallery: GalleryState,
    /// Decoded thumbnails keyed by image URL
    thumbnails: HashMap<String, image::Handle>,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User switched tabs
    TabSelected(Tab),

    // ========== Upload ==========
    /// User clicked the file picker
    PickFile,
    /// User discarded the pending selection
    ClearSelection,
    /// Label input changed
    LabelsChanged(String),
    /// User submitted the pending file
    SubmitUpload,
    /// Background upload completed (reconciled either way)
    UploadFinished(UploadOutcome),

    // ========== Search ==========
    /// Query input changed
    QueryChanged(String),
    /// User submitted the query
    SubmitSearch,
    /// Background search completed (reconciled either way)
    SearchFinished(SearchOutcome),
    /// Thumbnail bytes arrived for a URL (None if the fetch failed)
    ThumbnailFetched(String, Option<Vec<u8>>),

    // ========== Gallery ==========
    /// Pointer entered an item
    ImageHovered(String),
    /// Pointer left an item
    ImageUnhovered(String),
    /// An item (or its view action) was activated
    OpenImage(String),
    /// The detail modal was dismissed
    CloseModal,
}

impl ImageVault {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let client = VaultClient::from_env();
        println!("🗄  Image Vault client ready ({})", client.base_url());

        // Previews from a previous session have nothing on screen to back
        preview::sweep_preview_cache();

        (
            ImageVault {
                client,
                active_tab: Tab::Upload,
                upload: UploadState::default(),
                search: SearchState::default(),
                gallery: GalleryState::default(),
                thumbnails: HashMap::new(),
                status: String::from("Ready."),
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::TabSelected(tab) => {
                self.active_tab = tab;
                Task::none()
            }

            Message::PickFile => {
                // Show the native file picker dialog
                let picked = FileDialog::new()
                    .set_title("Select an Image")
                    .add_filter(
                        "Images",
                        &["jpg", "jpeg", "png", "gif", "webp", "bmp", "tif", "tiff"],
                    )
                    .add_filter("All files", &["*"])
                    .pick_file();

                if let Some(path) = picked {
                    self.upload.select(PendingFile::from_path(path));
                }
                Task::none()
            }

            Message::ClearSelection => {
                self.upload.clear_selection();
                Task::none()
            }

            Message::LabelsChanged(value) => {
                self.upload.labels_raw = value;
                Task::none()
            }

            Message::SubmitUpload => {
                if !self.upload.can_submit() {
                    return Task::none();
                }
                let Some(file) = self.upload.selected.clone() else {
                    return Task::none();
                };

                // Reject non-images before anything goes on the wire
                if let Err(e) = upload::validate(&file) {
                    self.status = format!("⚠️  {e}");
                    return Task::none();
                }

                let labels = parse_labels(&self.upload.labels_raw);
                self.upload.start();
                self.status = format!("Uploading {}...", file.name);

                Task::perform(
                    upload::run_upload(self.client.clone(), file, labels),
                    Message::UploadFinished,
                )
            }

            Message::UploadFinished(outcome) => {
                self.status = match &outcome.error {
                    None => format!("✅ Uploaded {}.", outcome.image.filename),
                    Some(reason) => {
                        format!("⚠️  Upload failed ({reason}); showing a local preview.")
                    }
                };

                let task = if outcome.image.is_remote() {
                    self.fetch_thumbnail(&outcome.image.url)
                } else {
                    Task::none()
                };
                self.upload.finish(outcome);
                task
            }

            Message::QueryChanged(value) => {
                self.search.query = value;
                Task::none()
            }

            Message::SubmitSearch => match self.search.begin() {
                Some(label) => {
                    self.status = format!("Searching for '{label}'...");
                    Task::perform(
                        search::run_search(self.client.clone(), label),
                        Message::SearchFinished,
                    )
                }
                None => Task::none(),
            },

            Message::SearchFinished(outcome) => {
                // New collection: stale hover/modal state must not survive it
                self.gallery.reset();

                match self.search.finish(outcome) {
                    Some(notice) => self.status = format!("❌ {notice}"),
                    None => {
                        self.status = match self.search.images.len() {
                            0 => String::from("No images found."),
                            1 => String::from("Found 1 image."),
                            n => format!("Found {n} images."),
                        }
                    }
                }

                self.fetch_missing_thumbnails()
            }

            Message::ThumbnailFetched(url, Some(bytes)) => {
                self.thumbnails.insert(url, image::Handle::from_bytes(bytes));
                Task::none()
            }

            Message::ThumbnailFetched(url, None) => {
                // Leave the placeholder; the grid stays usable
                eprintln!("⚠️  Could not fetch thumbnail: {url}");
                Task::none()
            }

            Message::ImageHovered(id) => {
                self.gallery.hover_enter(id);
                Task::none()
            }

            Message::ImageUnhovered(id) => {
                self.gallery.hover_leave(&id);
                Task::none()
            }

            Message::OpenImage(id) => {
                if let Some(found) = self.search.images.iter().find(|image| image.id == id) {
                    self.gallery.select(found.clone());
                }
                Task::none()
            }

            Message::CloseModal => {
                self.gallery.close();
                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let header = column![
            text("Image Vault").size(42),
            text("Store, search, and discover your images").size(16),
        ]
        .spacing(6)
        .align_x(Alignment::Center);

        let tabs = row![
            self.tab_button("Upload", Tab::Upload),
            self.tab_button("Search", Tab::Search),
        ]
        .spacing(10);

        let content = match self.active_tab {
            Tab::Upload => self.upload_view(),
            Tab::Search => self.search_view(),
        };

        let base = container(
            column![header, tabs, content, text(&self.status).size(14)]
                .spacing(24)
                .padding(30)
                .align_x(Alignment::Center),
        )
        .width(Length::Fill)
        .center_x(Length::Fill);

        match self.gallery.selected() {
            Some(selected) => modal(base, self.detail_view(selected), Message::CloseModal),
            None => base.into(),
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }

    fn tab_button(&self, label: &'static str, tab: Tab) -> Element<Message> {
        let style: fn(&Theme, button::Status) -> button::Style = if self.active_tab == tab {
            button::primary
        } else {
            button::secondary
        };

        button(text(label).size(16))
            .style(style)
            .padding(10)
            .on_press(Message::TabSelected(tab))
            .into()
    }

    /// The upload tab: picker, label input, submit, and the latest outcome
    fn upload_view(&self) -> Element<Message> {
        let picker: Element<Message> = if self.upload.is_uploading {
            column![text("Uploading image...").size(20)]
                .align_x(Alignment::Center)
                .into()
        } else {
            match &self.upload.selected {
                Some(file) => column![
                    text(&file.name).size(20),
                    text(format!("{:.2} KB", file.size as f64 / 1024.0)).size(14),
                    button("Change File").on_press(Message::ClearSelection),
                ]
                .spacing(8)
                .align_x(Alignment::Center)
                .into(),
                None => column![
                    text("Select an image to upload").size(20),
                    button("Browse...").on_press(Message::PickFile),
                    text("Supports: JPG, PNG, GIF, WebP").size(12),
                ]
                .spacing(8)
                .align_x(Alignment::Center)
                .into(),
            }
        };

        let mut content = Column::new()
            .push(picker)
            .spacing(20)
            .align_x(Alignment::Center);

        if self.upload.selected.is_some() && !self.upload.is_uploading {
            let labels_input =
                text_input("e.g., nature, landscape, sunset", &self.upload.labels_raw)
                    .on_input(Message::LabelsChanged)
                    .on_submit(Message::SubmitUpload)
                    .width(360);

            content = content.push(
                column![
                    text("Custom Labels (comma-separated)").size(14),
                    labels_input,
                    text("Enter labels separated by commas to help organize your images")
                        .size(12),
                ]
                .spacing(6)
                .align_x(Alignment::Center),
            );

            content = content.push(
                button("Upload Image")
                    .padding(10)
                    .on_press_maybe(self.upload.can_submit().then_some(Message::SubmitUpload)),
            );
        }

        if let Some(outcome) = &self.upload.result {
            content = content.push(self.upload_result_view(outcome));
        }

        content.into()
    }

    /// Card showing the reconciled outcome of the last upload
    fn upload_result_view(&self, outcome: &UploadOutcome) -> Element<Message> {
        let headline = if outcome.fallback {
            "Saved locally (upload did not go through)"
        } else {
            "Upload Successful!"
        };

        let mut info = column![text(format!("Filename: {}", outcome.image.filename)).size(14)]
            .spacing(4)
            .align_x(Alignment::Center);

        if let Some(size) = outcome.image.size {
            info = info.push(text(format!("Size: {:.2} KB", size as f64 / 1024.0)).size(14));
        }
        if let Some(labels) = &outcome.image.labels {
            if !labels.is_empty() {
                info = info.push(text(format!("Labels: {}", labels.join(", "))).size(14));
            }
        }

        container(
            column![
                text(headline).size(22),
                self.picture_for(&outcome.image, 320.0),
                info,
            ]
            .spacing(12)
            .align_x(Alignment::Center)
            .padding(20),
        )
        .style(container::rounded_box)
        .into()
    }

    /// The search tab: query bar plus placeholder, results, or spinner text
    fn search_view(&self) -> Element<Message> {
        let query_input = {
            let base = text_input(
                "Search images by keyword, filename, or tags...",
                &self.search.query,
            )
            .width(420);

            // Disabled while a request is in flight
            if self.search.is_searching {
                base
            } else {
                base.on_input(Message::QueryChanged)
                    .on_submit(Message::SubmitSearch)
            }
        };

        let submit = button(if self.search.is_searching {
            "Searching..."
        } else {
            "Search"
        })
        .padding(10)
        .on_press_maybe(self.search.can_submit().then_some(Message::SubmitSearch));

        let bar = row![query_input, submit]
            .spacing(10)
            .align_y(Alignment::Center);

        let body: Element<Message> = if self.search.is_searching {
            column![text("Searching...").size(18)]
                .align_x(Alignment::Center)
                .into()
        } else if self.search.has_searched {
            let count = self.search.images.len();
            let headline = match count {
                0 => String::from("No images found"),
                1 => String::from("Found 1 image"),
                n => format!("Found {n} images"),
            };

            let mut results = column![text(headline).size(20)]
                .spacing(16)
                .align_x(Alignment::Center);
            if count > 0 {
                results = results.push(self.gallery_view());
            }
            results.into()
        } else {
            column![
                text("Start searching for images").size(20),
                text("Enter keywords, filenames, or tags to find your images").size(14),
            ]
            .spacing(8)
            .align_x(Alignment::Center)
            .into()
        };

        column![bar, body]
            .spacing(20)
            .align_x(Alignment::Center)
            .into()
    }

    /// The wrapped thumbnail grid
    fn gallery_view(&self) -> Element<Message> {
        let items: Vec<Element<Message>> = self
            .search
            .images
            .iter()
            .map(|image| self.gallery_item(image))
            .collect();

        scrollable(
            Wrap::with_elements(items)
                .spacing(12.0)
                .line_spacing(12.0),
        )
        .height(420)
        .into()
    }

    /// One grid cell: the thumbnail, plus an overlay while hovered
    fn gallery_item(&self, item: &VaultImage) -> Element<Message> {
        let thumb = self.picture_for(item, 180.0);

        let cell: Element<Message> = if self.gallery.is_hovered(&item.id) {
            let mut caption = column![text(item.filename.clone()).size(13)].spacing(2);
            if let Some(size) = item.size {
                caption = caption.push(text(format!("{:.2} KB", size as f64 / 1024.0)).size(11));
            }
            if let Some(labels) = &item.labels {
                if !labels.is_empty() {
                    caption = caption.push(text(labels.join(", ")).size(11));
                }
            }

            // The view action consumes its click; the cell's own open
            // action below must not fire for it
            let view_action = button(text("View").size(12))
                .padding(6)
                .on_press(Message::OpenImage(item.id.clone()));

            let overlay = container(
                column![caption, view_action]
                    .spacing(6)
                    .align_x(Alignment::Center),
            )
            .width(Length::Fill)
            .height(Length::Fill)
            .align_x(Alignment::Center)
            .align_y(Alignment::Center)
            .style(|_theme| container::Style {
                background: Some(Color { a: 0.55, ..Color::BLACK }.into()),
                text_color: Some(Color::WHITE),
                ..container::Style::default()
            });

            stack![thumb, overlay].into()
        } else {
            thumb
        };

        mouse_area(container(cell).width(180).height(180))
            .on_enter(Message::ImageHovered(item.id.clone()))
            .on_exit(Message::ImageUnhovered(item.id.clone()))
            .on_press(Message::OpenImage(item.id.clone()))
            .into()
    }

    /// Content of the detail modal
    fn detail_view(&self, item: &VaultImage) -> Element<Message> {
        let mut info = column![text(item.filename.clone()).size(18)]
            .spacing(4)
            .align_x(Alignment::Center);

        if let Some(size) = item.size {
            info = info.push(text(format!("{:.2} KB", size as f64 / 1024.0)).size(13));
        }
        if let Some(labels) = &item.labels {
            if !labels.is_empty() {
                info = info.push(text(format!("Labels: {}", labels.join(", "))).size(13));
            }
        }

        container(
            column![
                self.picture_for(item, 520.0),
                info,
                button("Close").padding(8).on_press(Message::CloseModal),
            ]
            .spacing(14)
            .align_x(Alignment::Center)
            .padding(24),
        )
        .style(container::rounded_box)
        .into()
    }

    /// Render an image at the given edge length, or a placeholder until
    /// its bytes arrive
    fn picture_for(&self, item: &VaultImage, size: f32) -> Element<Message> {
        let handle = if item.is_remote() {
            self.thumbnails.get(&item.url).cloned()
        } else {
            // Local preview paths load straight from disk
            Some(image::Handle::from_path(&item.url))
        };

        match handle {
            Some(handle) => image(handle).width(size).into(),
            None => container(text("Loading...").size(13))
                .width(size)
                .height(size)
                .align_x(Alignment::Center)
                .align_y(Alignment::Center)
                .into(),
        }
    }

    /// Fetch thumbnail bytes for one remote URL
    fn fetch_thumbnail(&self, url: &str) -> Task<Message> {
        let client = self.client.clone();
        let url = url.to_owned();

        Task::perform(
            async move {
                let bytes = client.fetch_bytes(&url).await;
                (url, bytes.ok())
            },
            |(url, bytes)| Message::ThumbnailFetched(url, bytes),
        )
    }

    /// Fetch every result thumbnail we do not already hold
    fn fetch_missing_thumbnails(&self) -> Task<Message> {
        let tasks: Vec<Task<Message>> = self
            .search
            .images
            .iter()
            .filter(|item| item.is_remote() && !self.thumbnails.contains_key(&item.url))
            .map(|item| self.fetch_thumbnail(&item.url))
            .collect();

        Task::batch(tasks)
    }
}

/// Overlay `content` on top of `base`, dimming the rest of the window.
/// Clicking outside the content emits `on_blur`.
fn modal<'a>(
    base: impl Into<Element<'a, Message>>,
    content: impl Into<Element<'a, Message>>,
    on_blur: Message,
) -> Element<'a, Message> {
    stack![
        base.into(),
        opaque(
            mouse_area(center(opaque(content)).style(|_theme| {
                container::Style {
                    background: Some(Color { a: 0.8, ..Color::BLACK }.into()),
                    ..container::Style::default()
                }
            }))
            .on_press(on_blur)
        )
    ]
    .into()
}

fn main() -> iced::Result {
    iced::application("Image Vault", ImageVault::update, ImageVault::view)
        .theme(ImageVault::theme)
        .centered()
        .run_with(ImageVault::new)
}
