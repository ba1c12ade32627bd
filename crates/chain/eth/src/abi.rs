//! Hand-rolled ABI encoding for the small fixed contract surface.
//!
//! The contract exposes one write, one read, and one event; full ABI
//! machinery is unnecessary. Selectors and topics are derived from the
//! canonical signatures with Keccak-256.

use sha3::{Digest, Keccak256};

use mint_chain_core::{Account, ContractError};

/// First four bytes of the Keccak-256 hash of a function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let digest = Keccak256::digest(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

/// Full Keccak-256 hash of an event signature, as a `0x`-prefixed topic.
pub fn event_topic(signature: &str) -> String {
    let digest = Keccak256::digest(signature.as_bytes());
    format!("0x{}", hex::encode(digest))
}

/// Calldata for a zero-argument function.
pub fn encode_call(selector: [u8; 4]) -> String {
    format!("0x{}", hex::encode(selector))
}

/// Calldata for a single-address-argument function.
pub fn encode_call_address(selector: [u8; 4], account: &Account) -> Result<String, ContractError> {
    let hex_part = account
        .as_str()
        .strip_prefix("0x")
        .ok_or_else(|| ContractError::InvalidData(format!("account missing 0x prefix: {account}")))?;
    let bytes = hex::decode(hex_part)
        .map_err(|e| ContractError::InvalidData(format!("account is not hex: {e}")))?;
    if bytes.len() != 20 {
        return Err(ContractError::InvalidData(format!(
            "account must be 20 bytes, got {}",
            bytes.len()
        )));
    }

    let mut data = Vec::with_capacity(4 + 32);
    data.extend_from_slice(&selector);
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(&bytes);
    Ok(format!("0x{}", hex::encode(data)))
}

/// Parse a JSON-RPC hex quantity (`0x1`, `0xab`, ...).
pub fn parse_quantity(value: &str) -> Result<u64, ContractError> {
    let hex_part = value
        .strip_prefix("0x")
        .ok_or_else(|| ContractError::InvalidData(format!("quantity missing 0x prefix: {value:?}")))?;
    u64::from_str_radix(hex_part, 16)
        .map_err(|e| ContractError::InvalidData(format!("bad quantity {value:?}: {e}")))
}

/// Format a JSON-RPC hex quantity.
pub fn format_quantity(value: u64) -> String {
    format!("0x{value:x}")
}

/// Parse a 32-byte ABI word holding an unsigned integer.
pub fn parse_u256_word(value: &str) -> Result<u64, ContractError> {
    let hex_part = value
        .strip_prefix("0x")
        .ok_or_else(|| ContractError::InvalidData(format!("word missing 0x prefix: {value:?}")))?;
    if hex_part.len() != 64 {
        return Err(ContractError::InvalidData(format!(
            "expected 32-byte word, got {} hex chars",
            hex_part.len()
        )));
    }

    let trimmed = hex_part.trim_start_matches('0');
    if trimmed.is_empty() {
        return Ok(0);
    }
    if trimmed.len() > 16 {
        return Err(ContractError::InvalidData(format!(
            "value exceeds u64 range: {value:?}"
        )));
    }
    u64::from_str_radix(trimmed, 16)
        .map_err(|e| ContractError::InvalidData(format!("bad word {value:?}: {e}")))
}

/// Extract the address from a 32-byte indexed-event topic.
pub fn address_from_topic(topic: &str) -> Result<Account, ContractError> {
    let hex_part = topic
        .strip_prefix("0x")
        .ok_or_else(|| ContractError::InvalidData(format!("topic missing 0x prefix: {topic:?}")))?;
    if hex_part.len() != 64 {
        return Err(ContractError::InvalidData(format!(
            "expected 32-byte topic, got {} hex chars",
            hex_part.len()
        )));
    }
    Ok(Account::new(format!("0x{}", &hex_part[24..])))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_matches_known_value() {
        // Canonical ERC-20 transfer selector.
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn event_topic_matches_known_value() {
        assert_eq!(
            event_topic("Transfer(address,address,uint256)"),
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn encode_call_address_pads_to_one_word() {
        let account = Account::new("0x1234567890123456789012345678901234567890");
        let data = encode_call_address([0xaa, 0xbb, 0xcc, 0xdd], &account).unwrap();
        assert_eq!(
            data,
            "0xaabbccdd0000000000000000000000001234567890123456789012345678901234567890"
        );
    }

    #[test]
    fn encode_call_address_rejects_short_accounts() {
        let account = Account::new("0x1234");
        assert!(encode_call_address([0; 4], &account).is_err());
    }

    #[test]
    fn quantity_round_trip() {
        assert_eq!(parse_quantity("0x0").unwrap(), 0);
        assert_eq!(parse_quantity("0x2a").unwrap(), 42);
        assert_eq!(format_quantity(42), "0x2a");
        assert!(parse_quantity("42").is_err());
    }

    #[test]
    fn u256_word_parsing() {
        let word = format!("0x{:064x}", 7u64);
        assert_eq!(parse_u256_word(&word).unwrap(), 7);

        let zero = format!("0x{}", "0".repeat(64));
        assert_eq!(parse_u256_word(&zero).unwrap(), 0);

        let too_big = format!("0x{}", "f".repeat(64));
        assert!(parse_u256_word(&too_big).is_err());

        assert!(parse_u256_word("0x1234").is_err());
    }

    #[test]
    fn address_recovered_from_topic() {
        let topic = "0x000000000000000000000000abcdef0123456789abcdef0123456789abcdef01";
        let account = address_from_topic(topic).unwrap();
        assert_eq!(
            account.as_str(),
            "0xabcdef0123456789abcdef0123456789abcdef01"
        );
    }
}
