//! Fields of the edit-server form.

use crate::api::{Server, ServerUpdate};
use crate::form::{FormField, FormValues, Rule, ValidationSchema};

pub const NAME_REQUIRED: &str = "Server name required*";
pub const IMAGE_URL_REQUIRED: &str = "Image URL is required.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ServerField {
    ImageUrl,
    Name,
}

impl FormField for ServerField {
    const ALL: &'static [Self] = &[Self::ImageUrl, Self::Name];

    fn key(self) -> &'static str {
        match self {
            Self::ImageUrl => "imageUrl",
            Self::Name => "name",
        }
    }
}

/// Both fields are required. `image_url` is a URL in practice but only
/// non-emptiness is enforced.
pub fn server_schema() -> ValidationSchema<ServerField> {
    ValidationSchema::new()
        .rule(ServerField::Name, Rule::MinLength(1), NAME_REQUIRED)
        .rule(ServerField::ImageUrl, Rule::MinLength(1), IMAGE_URL_REQUIRED)
}

impl ServerField {
    /// Form values taken from an existing server.
    pub fn values_of(server: &Server) -> [(Self, String); 2] {
        [
            (Self::Name, server.name.clone()),
            (Self::ImageUrl, server.image_url.clone()),
        ]
    }
}

impl From<&FormValues<ServerField>> for ServerUpdate {
    fn from(values: &FormValues<ServerField>) -> Self {
        Self {
            name: values.get(ServerField::Name).to_string(),
            image_url: values.get(ServerField::ImageUrl).to_string(),
        }
    }
}
