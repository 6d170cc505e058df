use base64::{URL_SAFE_NO_PAD, encode_config};
use jwt_simple::prelude::ES256KeyPair;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::error::{ConsoleError, ConsoleResult};

// 0x04 || x || y
pub const SERVER_KEY_LEN: usize = 65;

#[derive(Debug, Clone)]
pub struct VapidCredentials {
    pub private_key: String,
    pub public_key: String,
}

pub fn decode_application_server_key(encoded: &str) -> ConsoleResult<Vec<u8>> {
    let encoded = encoded.trim();
    let padding = (4 - encoded.len() % 4) % 4;
    let standard: String = encoded
        .chars()
        .chain(std::iter::repeat_n('=', padding))
        .map(|ch| match ch {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    base64::decode(&standard).map_err(|err| ConsoleError::InvalidServerKey(err.to_string()))
}

pub fn is_uncompressed_p256_point(key: &[u8]) -> bool {
    key.len() == SERVER_KEY_LEN && key[0] == 0x04
}

pub fn generate_vapid_credentials() -> Result<VapidCredentials, web_push::WebPushError> {
    let mut rng = OsRng;
    generate_vapid_credentials_with_rng(&mut rng)
}

pub(crate) fn generate_vapid_credentials_with_rng<R: RngCore + CryptoRng>(
    rng: &mut R,
) -> Result<VapidCredentials, web_push::WebPushError> {
    let key_pair = generate_es256_keypair_with_rng(rng);
    let private_key = encode_config(key_pair.to_bytes(), URL_SAFE_NO_PAD);
    let public_key =
        web_push::VapidSignatureBuilder::from_base64_no_sub(&private_key, URL_SAFE_NO_PAD)?
            .get_public_key();
    let public_key = encode_config(public_key, URL_SAFE_NO_PAD);

    Ok(VapidCredentials {
        private_key,
        public_key,
    })
}

fn generate_es256_keypair_with_rng<R: RngCore + CryptoRng>(rng: &mut R) -> ES256KeyPair {
    let mut key_bytes = [0u8; 32];
    loop {
        rng.fill_bytes(&mut key_bytes);
        if let Ok(key_pair) = ES256KeyPair::from_bytes(&key_bytes) {
            return key_pair;
        }
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn decode_application_server_key__should_translate_url_safe_alphabet() {
        // When
        let bytes = decode_application_server_key("FOO-_BAR").expect("decode");

        // Then
        assert_eq!(bytes, vec![0x14, 0xe3, 0xbe, 0xfc, 0x10, 0x11]);
    }

    #[test]
    fn decode_application_server_key__should_restore_missing_padding() {
        assert_eq!(decode_application_server_key("AQ").expect("decode"), vec![1]);
        assert_eq!(
            decode_application_server_key("AQID").expect("decode"),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn decode_application_server_key__should_reject_invalid_input() {
        // When
        let result = decode_application_server_key("not base64!");

        // Then
        assert!(matches!(result, Err(ConsoleError::InvalidServerKey(_))));
    }

    #[test]
    fn generate_vapid_credentials_with_rng__should_return_expected_fixture() {
        // Given
        let seed = [7u8; 32];
        let mut rng = StdRng::from_seed(seed);

        // When
        let credentials =
            generate_vapid_credentials_with_rng(&mut rng).expect("credentials should generate");

        // Then
        assert_eq!(
            credentials.private_key,
            "9pKJeIXAyyCj5M0QagsVvDYHlPF-cymJCbB5iHPsdEE"
        );
        assert_eq!(
            credentials.public_key,
            "BCRweRf_U5iQM4pKNucGRzM6OuLp8Hisa8yX0N2ePIf1oxKitvFT6qvuGgYoTxlMatMDaytXbZR3rVClc2w_p6U"
        );
    }

    #[test]
    fn decode_application_server_key__should_accept_generated_public_key() {
        // Given
        let mut rng = StdRng::from_seed([3u8; 32]);
        let credentials = generate_vapid_credentials_with_rng(&mut rng).expect("credentials");

        // When
        let key = decode_application_server_key(&credentials.public_key).expect("decode");

        // Then
        assert!(is_uncompressed_p256_point(&key));
    }
}
