use std::{f32::consts::PI, fmt, sync::Arc};

use realfft::{num_complex::Complex32, RealFftPlanner, RealToComplex};

use crate::{CognifyError, Result};

/// Magnitude spectrum of the oscillator output, the data behind the bar
/// waveform. Mirrors what an analyser node would expose.
pub struct SpectrumAnalyser {
    sample_rate: u32,
    planner: RealFftPlanner<f32>,
    fft: Option<FftResources>,
    magnitudes: Vec<f32>,
}

impl SpectrumAnalyser {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate.max(1),
            planner: RealFftPlanner::new(),
            fft: None,
            magnitudes: Vec::new(),
        }
    }

    /// Magnitudes of the last analysed block, one per FFT bin.
    pub fn magnitudes(&self) -> &[f32] {
        &self.magnitudes
    }

    pub fn bin_hz(&self) -> f32 {
        match self.fft.as_ref() {
            Some(fft) => self.sample_rate as f32 / fft.size as f32,
            None => 0.0,
        }
    }

    /// Runs a Hann-windowed FFT over `samples`.
    pub fn analyse(&mut self, samples: &[f32]) -> Result<&[f32]> {
        if samples.len() < 2 {
            return Err(CognifyError::InvalidInput(
                "spectrum analysis requires blocks with at least two samples",
            ));
        }

        let len = samples.len();
        let fft = self.prepare_fft(len);

        for (index, value) in samples.iter().enumerate() {
            fft.input[index] = *value * hann_value(index, len);
        }

        fft.plan
            .process_with_scratch(&mut fft.input, &mut fft.spectrum, &mut fft.scratch)
            .map_err(|err| CognifyError::msg(format!("fft failed: {err}")))?;

        let scale = 2.0 / len as f32;
        let magnitudes: Vec<f32> = fft.spectrum.iter().map(|bin| bin.norm() * scale).collect();
        self.magnitudes = magnitudes;
        Ok(&self.magnitudes)
    }

    /// Frequency of the strongest bin of the last block.
    pub fn dominant_frequency(&self) -> Option<f32> {
        let (index, magnitude) = self
            .magnitudes
            .iter()
            .enumerate()
            .skip(1)
            .max_by(|a, b| a.1.total_cmp(b.1))?;

        if *magnitude <= f32::EPSILON {
            return None;
        }
        Some(index as f32 * self.bin_hz())
    }

    /// Groups the spectrum into `count` equal-width bands, each normalised
    /// against the loudest band.
    pub fn bars(&self, count: usize) -> Vec<f32> {
        if count == 0 || self.magnitudes.is_empty() {
            return vec![0.0; count];
        }

        let per_bar = (self.magnitudes.len() as f32 / count as f32).max(1.0);
        let mut bars: Vec<f32> = (0..count)
            .map(|bar| {
                let len = self.magnitudes.len();
                let start = ((bar as f32 * per_bar) as usize).min(len);
                let end = (((bar + 1) as f32 * per_bar) as usize).clamp(start, len);
                self.magnitudes[start..end].iter().copied().fold(0.0, f32::max)
            })
            .collect();

        let loudest = bars.iter().copied().fold(0.0, f32::max);
        if loudest > f32::EPSILON {
            for bar in &mut bars {
                *bar /= loudest;
            }
        }
        bars
    }

    fn prepare_fft(&mut self, size: usize) -> &mut FftResources {
        if self.fft.as_ref().is_some_and(|fft| fft.size != size) {
            self.fft = None;
        }

        let planner = &mut self.planner;
        self.fft.get_or_insert_with(|| {
            let plan = planner.plan_fft_forward(size);
            FftResources {
                size,
                scratch: plan.make_scratch_vec(),
                spectrum: plan.make_output_vec(),
                input: plan.make_input_vec(),
                plan,
            }
        })
    }
}

struct FftResources {
    size: usize,
    plan: Arc<dyn RealToComplex<f32>>,
    scratch: Vec<Complex32>,
    spectrum: Vec<Complex32>,
    input: Vec<f32>,
}

impl fmt::Debug for SpectrumAnalyser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectrumAnalyser")
            .field("sample_rate", &self.sample_rate)
            .field("fft_size", &self.fft.as_ref().map(|fft| fft.size))
            .field("bins", &self.magnitudes.len())
            .finish()
    }
}

fn hann_value(index: usize, len: usize) -> f32 {
    if len <= 1 {
        return 1.0;
    }

    0.5 - 0.5 * ((2.0 * PI * index as f32) / (len as f32 - 1.0)).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioBackend, SineVoice};

    #[test]
    fn finds_the_oscillator_frequency() {
        let mut voice = SineVoice::new(8_000);
        voice.start().unwrap();
        voice.set_frequency(1_000.0, 0.0);

        let mut block = vec![0.0_f32; 1024];
        voice.render(&mut block);

        let mut analyser = SpectrumAnalyser::new(8_000);
        analyser.analyse(&block).unwrap();

        let dominant = analyser.dominant_frequency().unwrap();
        assert!((dominant - 1_000.0).abs() <= analyser.bin_hz(), "dominant {dominant}");
    }

    #[test]
    fn silence_has_no_dominant_frequency() {
        let mut analyser = SpectrumAnalyser::new(8_000);
        analyser.analyse(&[0.0; 256]).unwrap();

        assert_eq!(analyser.dominant_frequency(), None);
        assert!(analyser.bars(8).iter().all(|bar| *bar == 0.0));
    }

    #[test]
    fn bars_are_normalised() {
        let mut voice = SineVoice::new(8_000);
        voice.start().unwrap();
        voice.set_frequency(500.0, 0.0);
        let mut block = vec![0.0_f32; 512];
        voice.render(&mut block);

        let mut analyser = SpectrumAnalyser::new(8_000);
        analyser.analyse(&block).unwrap();
        let bars = analyser.bars(16);

        assert_eq!(bars.len(), 16);
        assert!(bars.iter().any(|bar| (*bar - 1.0).abs() < f32::EPSILON));
        assert!(bars.iter().all(|bar| (0.0..=1.0).contains(bar)));
    }

    #[test]
    fn rejects_tiny_blocks() {
        let mut analyser = SpectrumAnalyser::new(8_000);
        assert!(analyser.analyse(&[1.0]).is_err());
        assert!(analyser.bars(0).is_empty());
    }
}
