// SPDX-License-Identifier: MIT

pub mod tiff;
