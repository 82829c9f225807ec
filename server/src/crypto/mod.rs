pub mod cipher;

pub use cipher::{
    decrypt, derive_key, encrypt, open_stored, seal_stored, CipherError, DerivedKey,
};
