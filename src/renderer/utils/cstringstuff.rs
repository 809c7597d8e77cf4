use std::{ffi::CString, os::raw::c_char};

/// Copies a NUL-terminated fixed-size Vulkan name array into an owned string.
pub fn c_char_slice_to_cstring(input: &[c_char]) -> CString {
    let bytes: Vec<u8> = input
        .iter()
        .take_while(|c| **c != 0)
        .map(|c| *c as u8)
        .collect();
    // take_while stopped at the first NUL, none remain
    unsafe { CString::from_vec_unchecked(bytes) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_at_first_nul() {
        let mut raw = [0 as c_char; 16];
        for (dst, src) in raw.iter_mut().zip(b"VK_KHR_swapchain".iter().take(15)) {
            *dst = *src as c_char;
        }
        raw[6] = 0;

        assert_eq!(c_char_slice_to_cstring(&raw).to_str().unwrap(), "VK_KHR");
    }

    #[test]
    fn unterminated_uses_whole_slice() {
        let raw: Vec<c_char> = b"main".iter().map(|b| *b as c_char).collect();

        assert_eq!(c_char_slice_to_cstring(&raw).as_bytes(), b"main");
    }
}
