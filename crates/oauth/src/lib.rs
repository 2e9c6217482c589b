//! Token exchange with the Aplos and Virtuous CRM APIs.

pub mod aplos;
pub mod decrypt;
pub mod error;
mod response;
pub mod types;
pub mod virtuous;

pub use {
    aplos::{
        AplosClient, accounts_url, acquire_aplos_token, auth_url, fetch_aplos_accounts,
        normalize_base_url,
    },
    decrypt::{decrypt_token, load_private_key, normalize_pem},
    error::{DecryptionError, ErrorKind, Provider, ProviderError},
    types::{AccessToken, AccountListing, EncryptedToken, TOKEN_PREVIEW_LEN, token_preview},
    virtuous::{VirtuousClient, acquire_virtuous_token},
};
