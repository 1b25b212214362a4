#[allow(dead_code)]
fn needs_send<T: Send>() {}

#[allow(dead_code)]
fn needs_sync<T: Sync + ?Sized>() {}

#[test]
fn attributes_send_sync() {
    needs_send::<headless_context::ContextAttributes>();
    needs_sync::<headless_context::ContextAttributes>();
    needs_send::<headless_context::pixel_format::PixelFormat>();
    needs_sync::<headless_context::pixel_format::PixelFormat>();
}

#[test]
fn errors_send_sync() {
    // Errors can be reported from another thread than the context's.
    needs_send::<headless_context::ContextError>();
    needs_sync::<headless_context::ContextError>();
}
