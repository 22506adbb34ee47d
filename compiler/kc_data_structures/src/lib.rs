// Copyright (c) The kc contributors.
// Licensed under the MIT License.

pub mod span;
