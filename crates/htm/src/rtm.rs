//! Intel RTM adapter
//!
//! `XBEGIN` either starts a transaction (leaving `EAX` untouched, here
//! preloaded with `u32::MAX`) or, on abort, rolls back every register and
//! memory write made since and resumes at its fallback label with the abort
//! status in `EAX`. The fallback label is the next instruction, so both paths
//! leave [`xbegin`] through the same return; an abort looks like `begin`
//! returning a second time with a status.

use crate::TransactionalMemory;
use elision_core::{BeginResult, RawStatus};
use std::arch::asm;

/// Restricted Transactional Memory on x86_64
///
/// Only constructible through [`Rtm::detect`], so every instruction below is
/// known to be supported by the CPU.
#[derive(Debug, Clone, Copy)]
pub struct Rtm {
    _detected: (),
}

impl Rtm {
    /// RTM adapter if the CPU advertises and enables RTM
    ///
    /// Many parts ship with TSX disabled by microcode; those report no RTM
    /// and get `None` here.
    pub fn detect() -> Option<Self> {
        if is_x86_feature_detected!("rtm") {
            Some(Rtm { _detected: () })
        } else {
            None
        }
    }
}

/// # Safety
///
/// The CPU must support RTM.
#[inline(always)]
unsafe fn xbegin() -> u32 {
    let mut eax: u32 = RawStatus::STARTED;
    unsafe {
        asm!("xbegin 2f", "2:", inout("eax") eax, options(nostack));
    }
    eax
}

/// # Safety
///
/// The CPU must support RTM and a transaction must be active.
#[inline(always)]
unsafe fn xend() {
    unsafe {
        asm!("xend", options(nostack));
    }
}

/// # Safety
///
/// The CPU must support RTM.
#[inline(always)]
unsafe fn xtest() -> bool {
    let active: u8;
    unsafe {
        asm!("xtest", "setnz {active}", active = out(reg_byte) active, options(nostack, nomem));
    }
    active != 0
}

// XABORT only takes an immediate, so the runtime code selects one of 256
// instructions.
macro_rules! xabort_imm8 {
    ($code:expr; $($n:literal)*) => {
        match $code {
            $($n => unsafe {
                asm!("xabort {imm}", imm = const $n, options(noreturn, nostack))
            },)*
        }
    };
}

/// # Safety
///
/// The CPU must support RTM and a transaction must be active, otherwise
/// `XABORT` is a no-op and execution would fall off the end of the asm block.
#[inline(always)]
unsafe fn xabort(code: u8) -> ! {
    xabort_imm8!(code;
            0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15
            16 17 18 19 20 21 22 23 24 25 26 27 28 29 30 31
            32 33 34 35 36 37 38 39 40 41 42 43 44 45 46 47
            48 49 50 51 52 53 54 55 56 57 58 59 60 61 62 63
            64 65 66 67 68 69 70 71 72 73 74 75 76 77 78 79
            80 81 82 83 84 85 86 87 88 89 90 91 92 93 94 95
            96 97 98 99 100 101 102 103 104 105 106 107 108 109 110 111
            112 113 114 115 116 117 118 119 120 121 122 123 124 125 126 127
            128 129 130 131 132 133 134 135 136 137 138 139 140 141 142 143
            144 145 146 147 148 149 150 151 152 153 154 155 156 157 158 159
            160 161 162 163 164 165 166 167 168 169 170 171 172 173 174 175
            176 177 178 179 180 181 182 183 184 185 186 187 188 189 190 191
            192 193 194 195 196 197 198 199 200 201 202 203 204 205 206 207
            208 209 210 211 212 213 214 215 216 217 218 219 220 221 222 223
            224 225 226 227 228 229 230 231 232 233 234 235 236 237 238 239
            240 241 242 243 244 245 246 247 248 249 250 251 252 253 254 255
    )
}

impl TransactionalMemory for Rtm {
    #[inline(always)]
    fn begin(&self) -> BeginResult {
        // SAFETY: `Rtm` exists only when RTM was detected.
        BeginResult::from_xbegin(unsafe { xbegin() })
    }

    #[inline(always)]
    fn commit(&self) {
        if self.is_active() {
            // SAFETY: RTM detected, transaction active.
            unsafe { xend() }
        }
    }

    #[inline(always)]
    fn abort(&self, code: u8) -> RawStatus {
        if !self.is_active() {
            return RawStatus::explicit(code);
        }
        // SAFETY: RTM detected, transaction active. Does not return.
        unsafe { xabort(code) }
    }

    #[inline(always)]
    fn is_active(&self) -> bool {
        // SAFETY: `Rtm` exists only when RTM was detected.
        unsafe { xtest() }
    }

    fn name(&self) -> &'static str {
        "rtm"
    }
}
