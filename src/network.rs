//! The "brain": a stack of dense levels evaluated strictly feedforward with a
//! hard threshold, so outputs are binary control signals directly. There is
//! no gradient anywhere; brains only improve by being cloned and mutated.

use crate::geometry::lerp;
use crate::random::uniform_signed;
use rand::RngCore;
use rulinalg::matrix::{BaseMatrix, BaseMatrixMut, Matrix};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{error::Error, fs, path::Path};

// f64 parameters round-trip as raw bits so a reloaded brain behaves
// identically to the one that was saved
fn serialize_weights<S: Serializer>(m: &Matrix<f64>, s: S) -> Result<S::Ok, S::Error> {
    let rows: Vec<Vec<u64>> = m
        .data()
        .chunks(m.cols())
        .map(|row| row.iter().map(|&f| f64::to_bits(f)).collect())
        .collect();
    rows.serialize(s)
}

fn deserialize_weights<'de, D: Deserializer<'de>>(d: D) -> Result<Matrix<f64>, D::Error> {
    let rows = Vec::<Vec<u64>>::deserialize(d)?;
    let n_rows = rows.len();
    let n_cols = rows.first().map_or(0, |r| r.len());
    if rows.iter().any(|r| r.len() != n_cols) {
        return Err(serde::de::Error::custom("ragged weight rows"));
    }

    let flat: Vec<f64> = rows.into_iter().flatten().map(f64::from_bits).collect();
    Ok(Matrix::new(n_rows, n_cols, flat))
}

fn serialize_biases<S: Serializer>(b: &[f64], s: S) -> Result<S::Ok, S::Error> {
    b.iter()
        .map(|&f| f64::to_bits(f))
        .collect::<Vec<u64>>()
        .serialize(s)
}

fn deserialize_biases<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<f64>, D::Error> {
    Vec::<u64>::deserialize(d).map(|v| v.into_iter().map(f64::from_bits).collect())
}

/// One dense layer: an `inputs x outputs` weight matrix and one bias per
/// output neuron.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    #[serde(
        serialize_with = "serialize_weights",
        deserialize_with = "deserialize_weights"
    )]
    weights: Matrix<f64>,
    #[serde(
        serialize_with = "serialize_biases",
        deserialize_with = "deserialize_biases"
    )]
    biases: Vec<f64>,
}

impl Level {
    /// A level with every weight and bias drawn uniformly from [-1, 1).
    pub fn new(inputs: usize, outputs: usize, rng: &mut impl RngCore) -> Self {
        let weights: Vec<f64> = (0..inputs * outputs).map(|_| uniform_signed(rng)).collect();
        Self {
            weights: Matrix::new(inputs, outputs, weights),
            biases: (0..outputs).map(|_| uniform_signed(rng)).collect(),
        }
    }

    pub fn from_parts(weights: Matrix<f64>, biases: Vec<f64>) -> Result<Self, Box<dyn Error>> {
        if weights.cols() != biases.len() {
            return Err("one bias per output neuron required".into());
        }
        Ok(Self { weights, biases })
    }

    pub fn inputs(&self) -> usize {
        self.weights.rows()
    }

    pub fn outputs(&self) -> usize {
        self.weights.cols()
    }

    /// Weighted sums against a hard threshold: output j is 1.0 iff
    /// `sum_i input[i] * w[i][j] > bias[j]`, else 0.0.
    fn feed(&self, input: &[f64]) -> Vec<f64> {
        let sums = &Matrix::new(1, input.len(), input.to_vec()) * &self.weights;
        sums.data()
            .iter()
            .zip(self.biases.iter())
            .map(|(sum, bias)| if sum > bias { 1. } else { 0. })
            .collect()
    }

    fn mutate(&mut self, amount: f64, rng: &mut impl RngCore) {
        for w in self.weights.mut_data() {
            *w = lerp(*w, uniform_signed(rng), amount);
        }
        for b in self.biases.iter_mut() {
            *b = lerp(*b, uniform_signed(rng), amount);
        }
    }
}

impl PartialEq for Level {
    fn eq(&self, other: &Self) -> bool {
        self.weights.rows() == other.weights.rows()
            && self.weights.cols() == other.weights.cols()
            && self.weights.data() == other.weights.data()
            && self.biases == other.biases
    }
}

/// A feedforward stack of [Level]s. Level i's outputs are level i+1's inputs,
/// enforced at construction and re-checked on deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedForward {
    levels: Vec<Level>,
    #[serde(skip)]
    outputs: Vec<f64>,
}

// two brains are the same brain if their parameters match bit for bit; the
// transient output buffer does not participate
impl PartialEq for FeedForward {
    fn eq(&self, other: &Self) -> bool {
        self.levels == other.levels
    }
}

impl FeedForward {
    /// A freshly randomized network from a layer-size sequence, e.g.
    /// `[5, 6, 4]` for 5 sensor inputs, 6 hidden neurons, 4 control outputs.
    pub fn new(layer_sizes: &[usize], rng: &mut impl RngCore) -> Result<Self, Box<dyn Error>> {
        if layer_sizes.len() < 2 {
            return Err("a network needs at least an input and an output layer".into());
        }
        if layer_sizes.contains(&0) {
            return Err("zero-width layers are not allowed".into());
        }

        Ok(Self::assemble(
            layer_sizes
                .windows(2)
                .map(|w| Level::new(w[0], w[1], rng))
                .collect(),
        ))
    }

    /// Compose a network from prebuilt levels, checking that each level is
    /// internally consistent and that consecutive levels chain.
    pub fn from_levels(levels: Vec<Level>) -> Result<Self, Box<dyn Error>> {
        if levels.is_empty() {
            return Err("a network needs at least one level".into());
        }
        for level in &levels {
            if level.outputs() != level.biases.len() {
                return Err(format!(
                    "level carries {} biases for {} output neurons",
                    level.biases.len(),
                    level.outputs()
                )
                .into());
            }
        }
        for pair in levels.windows(2) {
            if pair[0].outputs() != pair[1].inputs() {
                return Err(format!(
                    "mismatched levels: {} outputs feeding {} inputs",
                    pair[0].outputs(),
                    pair[1].inputs()
                )
                .into());
            }
        }

        Ok(Self::assemble(levels))
    }

    fn assemble(levels: Vec<Level>) -> Self {
        let outputs = vec![0.; levels.last().map_or(0, Level::outputs)];
        Self { levels, outputs }
    }

    pub fn input_count(&self) -> usize {
        self.levels[0].inputs()
    }

    pub fn output_count(&self) -> usize {
        self.levels[self.levels.len() - 1].outputs()
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Feed `input` through every level in order. Errors when the input
    /// vector does not match the first level's width; it is never truncated
    /// or padded.
    pub fn step(&mut self, input: &[f64]) -> Result<(), Box<dyn Error>> {
        if input.len() != self.input_count() {
            return Err(format!(
                "expected {} inputs, got {}",
                self.input_count(),
                input.len()
            )
            .into());
        }

        let mut signal = self.levels[0].feed(input);
        for level in &self.levels[1..] {
            signal = level.feed(&signal);
        }
        self.outputs = signal;
        Ok(())
    }

    /// The binary outputs of the most recent [FeedForward::step].
    pub fn output(&self) -> &[f64] {
        &self.outputs
    }

    /// Blend every weight and bias toward a fresh uniform draw from [-1, 1).
    /// `amount` 0 leaves the network untouched, 1 rerandomizes it entirely.
    pub fn mutate(&mut self, amount: f64, rng: &mut impl RngCore) {
        debug_assert!((0. ..=1.).contains(&amount));
        for level in self.levels.iter_mut() {
            level.mutate(amount, rng);
        }
    }

    pub fn to_string(&self) -> Result<String, Box<dyn Error>> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let parsed: Self = serde_json::from_str(s)?;
        // bias widths and level chaining are invariants of construction, so a
        // brain edited or corrupted on disk must be rejected here
        Self::from_levels(parsed.levels)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn Error>> {
        fs::write(path, self.to_string()?)?;
        Ok(())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        Self::from_str(&fs::read_to_string(path)?)
    }
}
