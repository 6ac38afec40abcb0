pub mod types;
pub mod utils;
pub mod money;
pub mod env;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health { status: "ok", version: "0.1.0" };
        assert_eq!(h.status, "ok");
    }
}
