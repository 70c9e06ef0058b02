mod image_picker;
mod list;
mod text_input;

pub use image_picker::{ImagePicker, ImagePickerEvent};
pub use list::{List, ListEvent, ListRow};
pub use text_input::{TextInput, TextInputEvent};
