// utils.rs - Sphinx utility functions
// Copyright (C) 2018  David Anthony Stainton and Jeffrey Burdges.
//
// MIT License
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

/// XOR two equal length buffers into a new buffer.
pub fn xor(a: &[u8], b: &[u8]) -> Vec<u8> {
    assert!(a.len() == b.len());
    a.iter().zip(b.iter()).map(|(a_i, b_i)| a_i ^ b_i).collect()
}

pub fn xor_assign(a: &mut [u8], b: &[u8]) {
    assert!(a.len() == b.len());
    for (a_i, &b_i) in a.iter_mut().zip(b.iter()) {
        *a_i ^= b_i;
    }
}

/// Return `prefix` followed by `buf`, truncated to the length of `buf`.
/// Whatever is pushed past the end is dropped.
pub fn shift_right(buf: &[u8], prefix: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(buf.len());
    out.extend_from_slice(&prefix[..prefix.len().min(buf.len())]);
    let keep = buf.len() - out.len();
    out.extend_from_slice(&buf[..keep]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xor_test() {
        let a = [0x0fu8, 0xf0, 0xaa];
        let b = [0xffu8, 0xff, 0xaa];
        assert_eq!(xor(&a, &b), vec![0xf0, 0x0f, 0x00]);
        let mut c = a;
        xor_assign(&mut c, &b);
        assert_eq!(&c[..], &xor(&a, &b)[..]);
    }

    #[test]
    fn shift_right_test() {
        let buf = [1u8, 2, 3, 4, 5];
        assert_eq!(shift_right(&buf, &[9, 8]), vec![9, 8, 1, 2, 3]);
        assert_eq!(shift_right(&buf, &[]), buf.to_vec());
        assert_eq!(shift_right(&buf, &[7; 6]), vec![7; 5]);
    }
}
