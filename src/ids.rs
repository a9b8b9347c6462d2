//! Id helpers: uuid7 identities encoded with bech32

use bech32::Bech32m;
use uuid7::uuid7;

#[derive(thiserror::Error, Debug)]
pub enum IdError {
    #[error("invalid human readable part: {0}")]
    Hrp(#[from] bech32::primitives::hrp::Error),
    #[error("bech32 encoding failed: {0}")]
    Encode(#[from] bech32::EncodeError),
}

// construct a unique id then encode using bech32
pub fn new_bech32_id(hrp: &str) -> Result<String, IdError> {
    let hrp = bech32::Hrp::parse(hrp)?;
    let encode = bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())?;
    Ok(encode)
}
