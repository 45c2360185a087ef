//! Runs in its own process: releasing everything would race the other FFI tests.

use textoolwrap::ffi::{self, EncodeByCrunchUnity, FreeAllPending, PickUpAndFree};
use textoolwrap::format::mode;

use crate::common::gradient_rgba;

mod common;

#[test]
fn free_all_pending_releases_unpicked_results() {
    let rgba = gradient_rgba(8, 8);
    let mut handles = Vec::new();
    for _ in 0..3 {
        let mut handle = -1;
        let size = unsafe {
            EncodeByCrunchUnity(rgba.as_ptr().cast(), &mut handle, mode::DXT1_CRUNCHED, 50, 8, 8, 1, 1)
        };
        assert!(size > 0);
        handles.push((handle, size));
    }

    assert_eq!(ffi::registry().len(), 3);
    assert_eq!(FreeAllPending(), 3);
    assert_eq!(FreeAllPending(), 0);

    for (handle, size) in handles {
        let mut out = vec![0u8; size as usize];
        assert!(!unsafe { PickUpAndFree(out.as_mut_ptr().cast(), size, handle) });
    }
}
