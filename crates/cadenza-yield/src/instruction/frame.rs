// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt;

/// A point in the frame at which the driver resumes deferred callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramePhase {
    /// After all cameras and GUI have rendered, before presentation.
    EndOfFrame,
    /// At the next fixed-timestep update.
    FixedUpdate,
}

impl fmt::Display for FramePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FramePhase::EndOfFrame => f.write_str("end of frame"),
            FramePhase::FixedUpdate => f.write_str("fixed update"),
        }
    }
}

/// Marker: resume after the current frame has been rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaitForEndOfFrame;

impl WaitForEndOfFrame {
    /// The phase this marker defers to.
    pub fn phase(&self) -> FramePhase {
        FramePhase::EndOfFrame
    }
}

/// Marker: resume at the next fixed-timestep update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaitForFixedUpdate;

impl WaitForFixedUpdate {
    /// The phase this marker defers to.
    pub fn phase(&self) -> FramePhase {
        FramePhase::FixedUpdate
    }
}
