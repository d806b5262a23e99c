use super::*;

pub(super) fn infer_reserved_networks(_opts: &InferOptions, family: AddressFamily) -> Vec<AddressPrefix> {
    tracing::debug!(family = family.as_str(), "当前平台暂不支持推断保留网段");
    Vec::new()
}
