pub mod batch;
pub mod codec;
pub mod error;
pub mod invoker;
pub mod locate;
pub mod mask;
pub mod pipeline;
pub mod server;
pub mod settings;
pub mod workspace;

/// Small helpers shared by both entry adapters
pub mod util {
    use rand::Rng;

    /// A fresh 12-hex-character request id. Uniqueness of these ids is what
    /// keeps concurrent workspaces disjoint.
    pub fn request_id() -> String {
        let n: u64 = rand::thread_rng().gen();
        format!("{:012x}", n & 0xffff_ffff_ffff)
    }


    #[cfg(test)]
    mod tests {
        use super::request_id;

        #[test]
        fn request_ids_are_twelve_hex_chars() {
            let id = request_id();
            assert_eq!(id.len(), 12);
            assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        }

        #[test]
        fn request_ids_are_distinct() {
            assert_ne!(request_id(), request_id());
        }
    }
}
