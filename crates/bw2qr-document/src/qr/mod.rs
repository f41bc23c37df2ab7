// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// QR module — symbol generation and independent read-back verification.

pub mod symbol;
pub mod verify;

pub use symbol::QrSymbol;
pub use verify::Verifier;
