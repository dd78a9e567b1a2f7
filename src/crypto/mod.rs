//! Local file encryption: the stream cipher, the password-keyed envelope
//! around it, password helpers, and the file jobs the upload form runs.

pub mod envelope;
pub mod files;
pub mod password;
pub mod rabbit;

pub use envelope::{decrypt_pdf, derive_key, encrypt_pdf, is_pdf};
pub use files::{Job, Mode, MAX_FILE_SIZE};
pub use password::{check_strength, generate_passphrase, generate_password, PasswordCheck, Strength};
pub use rabbit::Rabbit;
