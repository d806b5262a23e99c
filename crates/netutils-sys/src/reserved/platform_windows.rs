use super::*;

pub(super) fn infer_reserved_networks(_opts: &InferOptions, _family: AddressFamily) -> Vec<AddressPrefix> {
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_empty() {
        assert!(infer_reserved_networks(&InferOptions::default(), AddressFamily::V4).is_empty());
        assert!(infer_reserved_networks(&InferOptions::default(), AddressFamily::V6).is_empty());
    }
}
