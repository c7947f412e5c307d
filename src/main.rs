// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Thomas Junier

use sigblast::errors::SigBlastError;

fn main() -> Result<(), SigBlastError> {
    sigblast::run()
}
