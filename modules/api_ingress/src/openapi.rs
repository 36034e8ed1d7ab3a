use utoipa::openapi::{InfoBuilder, OpenApi, OpenApiBuilder};

/// Empty document the module fragments are merged into.
pub fn base_document(title: &str, version: &str) -> OpenApi {
    OpenApiBuilder::new()
        .info(
            InfoBuilder::new()
                .title(title)
                .version(version)
                .description(Some("Operational user provisioning API"))
                .build(),
        )
        .build()
}

/// Merge module fragments in registration order; later paths never replace earlier ones.
pub fn merge_documents(mut base: OpenApi, fragments: impl IntoIterator<Item = OpenApi>) -> OpenApi {
    for fragment in fragments {
        base.merge(fragment);
    }
    base
}
