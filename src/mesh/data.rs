//! Named per-point and per-cell data arrays.

/// Storage for the values of a [`DataArray`].
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayValues {
    /// Floating point values.
    Float(Vec<f64>),
    /// Integer values (labels, ids).
    Int(Vec<i64>),
}

impl ArrayValues {
    /// Total number of scalar values.
    pub fn len(&self) -> usize {
        match self {
            ArrayValues::Float(v) => v.len(),
            ArrayValues::Int(v) => v.len(),
        }
    }

    /// True if there are no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named array with `num_comp` components per tuple, stored tuple-major.
#[derive(Debug, Clone, PartialEq)]
pub struct DataArray {
    /// Array name as stored in the mesh file.
    pub name: String,
    /// Number of components per tuple (1 for scalars, 3 for vectors).
    pub num_comp: usize,
    /// Flat values, `num_tuples() * num_comp` long.
    pub values: ArrayValues,
}

impl DataArray {
    /// Create a floating point array.
    pub fn float(name: impl Into<String>, num_comp: usize, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            num_comp,
            values: ArrayValues::Float(values),
        }
    }

    /// Create an integer array.
    pub fn int(name: impl Into<String>, num_comp: usize, values: Vec<i64>) -> Self {
        Self {
            name: name.into(),
            num_comp,
            values: ArrayValues::Int(values),
        }
    }

    /// Number of tuples.
    pub fn num_tuples(&self) -> usize {
        if self.num_comp == 0 {
            0
        } else {
            self.values.len() / self.num_comp
        }
    }

    /// Values converted to `f64`.
    pub fn to_f64(&self) -> Vec<f64> {
        match &self.values {
            ArrayValues::Float(v) => v.clone(),
            ArrayValues::Int(v) => v.iter().map(|&x| x as f64).collect(),
        }
    }

    /// New array holding the tuples at `indices`, in that order.
    ///
    /// Indices must be below [`num_tuples`](Self::num_tuples).
    pub fn select_tuples(&self, indices: &[usize]) -> DataArray {
        fn gather<T: Copy>(values: &[T], n: usize, indices: &[usize]) -> Vec<T> {
            indices
                .iter()
                .flat_map(|&i| values[i * n..(i + 1) * n].iter().copied())
                .collect()
        }
        let values = match &self.values {
            ArrayValues::Float(v) => ArrayValues::Float(gather(v, self.num_comp, indices)),
            ArrayValues::Int(v) => ArrayValues::Int(gather(v, self.num_comp, indices)),
        };
        DataArray {
            name: self.name.clone(),
            num_comp: self.num_comp,
            values,
        }
    }

    /// Values grouped as 3-component tuples, or `None` if `num_comp != 3`.
    pub fn to_vec3(&self) -> Option<Vec<[f64; 3]>> {
        if self.num_comp != 3 {
            return None;
        }
        Some(
            self.to_f64()
                .chunks_exact(3)
                .map(|c| [c[0], c[1], c[2]])
                .collect(),
        )
    }
}

/// Find an array by name.
pub fn find_array<'a>(arrays: &'a [DataArray], name: &str) -> Option<&'a DataArray> {
    arrays.iter().find(|a| a.name == name)
}

/// Insert `array`, replacing any existing array with the same name.
pub fn upsert_array(arrays: &mut Vec<DataArray>, array: DataArray) {
    match arrays.iter_mut().find(|a| a.name == array.name) {
        Some(slot) => *slot = array,
        None => arrays.push(array),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_tuples() {
        let a = DataArray::float("c", 3, vec![0.0; 12]);
        assert_eq!(a.num_tuples(), 4);
        let b = DataArray::int("l", 1, vec![1, 2, 3]);
        assert_eq!(b.num_tuples(), 3);
    }

    #[test]
    fn test_to_vec3() {
        let a = DataArray::float("c", 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(a.to_vec3().unwrap(), vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        assert!(DataArray::int("l", 1, vec![1]).to_vec3().is_none());
    }

    #[test]
    fn test_select_tuples() {
        let a = DataArray::float("c", 2, vec![0.0, 1.0, 10.0, 11.0, 20.0, 21.0]);
        let picked = a.select_tuples(&[2, 0, 0]);
        assert_eq!(picked.num_comp, 2);
        assert_eq!(
            picked.values,
            ArrayValues::Float(vec![20.0, 21.0, 0.0, 1.0, 0.0, 1.0])
        );
        let l = DataArray::int("l", 1, vec![7, 9]);
        assert_eq!(l.select_tuples(&[0, 0]).values, ArrayValues::Int(vec![7, 7]));
    }

    #[test]
    fn test_upsert_replaces_by_name() {
        let mut arrays = vec![DataArray::int("a", 1, vec![1])];
        upsert_array(&mut arrays, DataArray::int("b", 1, vec![2]));
        upsert_array(&mut arrays, DataArray::int("a", 1, vec![3]));
        assert_eq!(arrays.len(), 2);
        assert_eq!(find_array(&arrays, "a").unwrap().values, ArrayValues::Int(vec![3]));
    }
}
