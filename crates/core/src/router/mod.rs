use crate::quantum::AudioBus;

/// Outcome of resolving the channel a processor operates on.
#[derive(Debug, PartialEq)]
pub enum Route<'a> {
    /// The first input group carries no channel.
    NoInput,
    /// The first output group carries no channel.
    NoOutput,
    /// Channel 0 of the first input group paired with channel 0 of the first
    /// output group.
    Connected {
        input: &'a [f32],
        output: &'a mut [f32],
    },
}

impl Route<'_> {
    pub fn is_connected(&self) -> bool {
        matches!(self, Route::Connected { .. })
    }
}

/// Resolves channel 0 of the first input and output groups.
///
/// A missing group is treated the same as a group with no channels. Any
/// channel past index 0 is ignored.
pub fn route<'a>(inputs: &'a [AudioBus], outputs: &'a mut [AudioBus]) -> Route<'a> {
    let Some(input) = inputs.first().and_then(|bus| bus.channel(0)) else {
        return Route::NoInput;
    };
    let Some(output) = outputs.first_mut().and_then(|bus| bus.channel_mut(0)) else {
        return Route::NoOutput;
    };

    Route::Connected { input, output }
}
