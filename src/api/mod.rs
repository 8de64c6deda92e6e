pub mod envelope;

pub use envelope::Envelope;

/// Base path of the contacts collection
pub const CONTACTS_PATH: &str = "/api/v1/contacts";

/// Path of a single contact resource, used for the `Location` header
pub fn contact_location(id: i64) -> String {
    format!("{}/{}", CONTACTS_PATH, id)
}
