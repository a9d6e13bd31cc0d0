// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn codes_are_stable_upper_snake_case() {
    assert_eq!(CoreError::TitleTooLong(300).code(), "INVALID_TITLE");
    assert_eq!(CoreError::InvalidPaneTarget.code(), "INVALID_PANE_TARGET");
    assert_eq!(
        CoreError::InvalidObservedLastActiveAt.code(),
        "INVALID_OBSERVED_LAST_ACTIVE_AT"
    );
}
