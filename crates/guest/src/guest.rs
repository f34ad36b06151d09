pub mod allocation;
pub mod module;
pub mod parameters;

pub use module::RenderModule;
pub use module::Renderer;
pub use parameters::ParameterStore;
pub use render_wasmer_common::*;

#[doc(hidden)]
pub use tracing;

#[macro_export]
/// Define every export of a render module for the given renderer.
///
/// ```ignore
/// render_wasmer_guest::render_exports!(WaveRenderer, WaveRenderer::default());
/// ```
///
/// The module state lives in a thread local, wasm only ever runs one. Input buffers passed to
/// `render` and `merge_in_skin` are consumed: the guest releases them before returning, so the host
/// must not release them again.
macro_rules! render_exports {
    ( $renderer:ty, $init:expr ) => {
        thread_local! {
            static RENDER_MODULE: ::std::cell::RefCell<$crate::RenderModule<$renderer>> =
                ::std::cell::RefCell::new($crate::RenderModule::new($init));
        }

        #[no_mangle]
        pub extern "C" fn allocate(len: $crate::Len) -> $crate::GuestPtr {
            $crate::allocation::allocate(len) as usize as $crate::GuestPtr
        }

        #[no_mangle]
        pub extern "C" fn release(ptr: $crate::GuestPtr, len: $crate::Len) {
            $crate::tracing::debug!(ptr, len, "release");
            unsafe { $crate::allocation::release(ptr as usize as *mut u8, len) }
        }

        #[no_mangle]
        pub extern "C" fn schema_version() -> u32 {
            RENDER_MODULE.with(|module| module.borrow().schema_version())
        }

        #[no_mangle]
        pub extern "C" fn render(ptr: $crate::GuestPtr, len: $crate::Len) -> $crate::GuestPtr {
            let input = unsafe { $crate::allocation::consume(ptr as usize as *mut u8, len) };
            let buffer = RENDER_MODULE.with(|module| module.borrow().render(&input));
            $crate::allocation::leak_bytes(&buffer) as usize as $crate::GuestPtr
        }

        #[no_mangle]
        pub extern "C" fn get_parameter(index: u32) -> $crate::PackedValue {
            RENDER_MODULE.with(|module| module.borrow().get_parameter(index))
        }

        #[no_mangle]
        pub extern "C" fn modify_parameter(index: u32, value: $crate::PackedValue) {
            RENDER_MODULE.with(|module| module.borrow_mut().modify_parameter(index, value))
        }

        #[no_mangle]
        pub extern "C" fn reset_parameters() {
            RENDER_MODULE.with(|module| module.borrow_mut().reset_parameters())
        }

        #[no_mangle]
        pub extern "C" fn export_parameters() -> $crate::GuestPtr {
            let buffer = RENDER_MODULE.with(|module| module.borrow().export_parameters());
            $crate::allocation::leak_bytes(&buffer) as usize as $crate::GuestPtr
        }

        #[no_mangle]
        pub extern "C" fn merge_in_skin(ptr: $crate::GuestPtr, len: $crate::Len) -> u32 {
            let input = unsafe { $crate::allocation::consume(ptr as usize as *mut u8, len) };
            RENDER_MODULE.with(|module| module.borrow_mut().merge_in_skin(&input))
        }
    };
}
