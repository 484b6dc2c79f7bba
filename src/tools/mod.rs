pub mod handlers;

pub use handlers::{
    download_artifact, generate_code, generate_document, generate_image, generate_presentation,
    text_to_speech,
};
