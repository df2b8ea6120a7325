use burn::tensor::{backend::Backend, Tensor};

/// Input side of a window pair; its rank depends on the return mode.
#[derive(Clone, Debug)]
pub enum InputWindow<B: Backend> {
    Track(Tensor<B, 3>), // [batch, window, channels]
    Fused(Tensor<B, 5>), // [batch, window, M, N, levels * channels]
}

impl<B: Backend> InputWindow<B> {
    /// Leading `(batch, window)` dimensions.
    pub fn leading_dims(&self) -> [usize; 2] {
        match self {
            InputWindow::Track(tensor) => {
                let [batch, window, _] = tensor.dims();
                [batch, window]
            }
            InputWindow::Fused(tensor) => {
                let [batch, window, _, _, _] = tensor.dims();
                [batch, window]
            }
        }
    }

    pub fn feature_width(&self) -> usize {
        match self {
            InputWindow::Track(tensor) => tensor.dims()[2],
            InputWindow::Fused(tensor) => tensor.dims()[4],
        }
    }

    pub fn into_track(self) -> Option<Tensor<B, 3>> {
        match self {
            InputWindow::Track(tensor) => Some(tensor),
            InputWindow::Fused(_) => None,
        }
    }

    pub fn into_fused(self) -> Option<Tensor<B, 5>> {
        match self {
            InputWindow::Fused(tensor) => Some(tensor),
            InputWindow::Track(_) => None,
        }
    }
}

impl<B: Backend> From<Tensor<B, 3>> for InputWindow<B> {
    fn from(tensor: Tensor<B, 3>) -> Self {
        InputWindow::Track(tensor)
    }
}

impl<B: Backend> From<Tensor<B, 5>> for InputWindow<B> {
    fn from(tensor: Tensor<B, 5>) -> Self {
        InputWindow::Fused(tensor)
    }
}

/// One model step: an input window and the track window it should predict.
#[derive(Clone, Debug)]
pub struct WindowPair<B: Backend, I = InputWindow<B>> {
    pub record: String,
    /// Position of the window within its record.
    pub slot: usize,
    pub input: I,
    pub target: Tensor<B, 3>, // [batch, window, output channels]
}

impl<B: Backend, I> WindowPair<B, I> {
    pub fn map_input<J>(self, f: impl FnOnce(I) -> J) -> WindowPair<B, J> {
        WindowPair {
            record: self.record,
            slot: self.slot,
            input: f(self.input),
            target: self.target,
        }
    }
}
