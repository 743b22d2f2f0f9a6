//! Integration tests: reading hail fields and parameter grids from NetCDF.

use std::path::{Path, PathBuf};

use approx::assert_relative_eq;
use hailgen_grid::{BoundingBox, GridCoords, GridError, TimeWindow};
use hailgen_io::{
    EncodingConfig, IoError, ParameterFiles, ReaderConfig, StorageDtype, read_field,
    read_field_multi, read_parameter_grid, write_parameter_field,
};
use ndarray::array;
use tempfile::tempdir;

// ---------------------------------------------------------------------------
// Helper: programmatic NetCDF fixture builder
// ---------------------------------------------------------------------------

struct FixtureBuilder {
    nt: usize,
    lats: Vec<f64>,
    lons: Vec<f64>,
    /// Offsets of each step in `time_units`.
    time_offsets: Vec<f64>,
    time_units: String,
    calendar: Option<String>,
    lat_name: &'static str,
    /// Flat data in `[t, lat, lon]` order.
    data: Vec<f64>,
    fill_value: Option<f64>,
    missing_value: Option<f64>,
}

impl FixtureBuilder {
    fn new(nt: usize, ny: usize, nx: usize) -> Self {
        Self {
            nt,
            lats: (0..ny).map(|i| 30.0 + i as f64).collect(),
            lons: (0..nx).map(|i| -100.0 + i as f64).collect(),
            time_offsets: (0..nt).map(|t| t as f64).collect(),
            time_units: "days since 2010-01-01".to_string(),
            calendar: None,
            lat_name: "lat",
            data: (0..nt * ny * nx).map(|i| i as f64 * 0.1).collect(),
            fill_value: None,
            missing_value: None,
        }
    }

    fn with_time(mut self, offsets: Vec<f64>, units: &str) -> Self {
        assert_eq!(offsets.len(), self.nt);
        self.time_offsets = offsets;
        self.time_units = units.to_string();
        self
    }

    fn with_calendar(mut self, calendar: &str) -> Self {
        self.calendar = Some(calendar.to_string());
        self
    }

    fn with_lat_name(mut self, name: &'static str) -> Self {
        self.lat_name = name;
        self
    }

    fn with_value(mut self, index: usize, value: f64) -> Self {
        self.data[index] = value;
        self
    }

    fn with_fill_value(mut self, fv: f64) -> Self {
        self.fill_value = Some(fv);
        self
    }

    fn with_missing_value(mut self, mv: f64) -> Self {
        self.missing_value = Some(mv);
        self
    }

    fn write(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = netcdf::create(&path).expect("create NetCDF file");
        file.add_dimension("time", self.nt).expect("add dim time");
        file.add_dimension(self.lat_name, self.lats.len()).expect("add dim lat");
        file.add_dimension("lon", self.lons.len()).expect("add dim lon");
        {
            let mut var = file
                .add_variable::<f64>(self.lat_name, &[self.lat_name])
                .expect("add var lat");
            var.put_values(&self.lats, ..).expect("put lat values");
        }
        {
            let mut var = file.add_variable::<f64>("lon", &["lon"]).expect("add var lon");
            var.put_values(&self.lons, ..).expect("put lon values");
        }
        {
            let mut var = file.add_variable::<f64>("time", &["time"]).expect("add var time");
            var.put_values(&self.time_offsets, ..).expect("put time values");
            var.put_attribute("units", self.time_units.as_str())
                .expect("add time units");
            if let Some(cal) = &self.calendar {
                var.put_attribute("calendar", cal.as_str())
                    .expect("add time calendar");
            }
        }
        {
            let mut var = file
                .add_variable::<f64>("hail_logits", &["time", self.lat_name, "lon"])
                .expect("add var hail_logits");
            if let Some(fv) = self.fill_value {
                var.put_attribute("_FillValue", fv).expect("add _FillValue");
            }
            if let Some(mv) = self.missing_value {
                var.put_attribute("missing_value", mv).expect("add missing_value");
            }
            var.put_values(&self.data, ..).expect("put data values");
        }
        path
    }
}

// ---------------------------------------------------------------------------
// read_field
// ---------------------------------------------------------------------------

#[test]
fn read_field_file_not_found() {
    let err = read_field(Path::new("/tmp/hailgen_missing_input.nc"), &ReaderConfig::default())
        .unwrap_err();
    assert!(
        matches!(err, IoError::FileNotFound { .. }),
        "expected FileNotFound, got {err:?}"
    );
}

#[test]
fn read_field_invalid_config_rejects_early() {
    let config = ReaderConfig::default().with_variable("");
    let err = read_field(Path::new("/tmp/hailgen_missing_input.nc"), &config).unwrap_err();
    assert!(matches!(err, IoError::Validation { .. }), "got {err:?}");
}

#[test]
fn read_whole_field() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(4, 2, 3).write(dir.path(), "in.nc");

    let field = read_field(&path, &ReaderConfig::default()).unwrap();
    assert_eq!(field.values().dim(), (4, 2, 3));
    assert_eq!(field.coords().lats(), &[30.0, 31.0]);
    assert_eq!(field.times()[1].to_string(), "2010-01-02 00:00:00");
    assert_relative_eq!(field.values()[[3, 1, 2]], 2.3, epsilon = 1e-12);
}

#[test]
fn window_and_bbox_select_hyperslab() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(5, 3, 4).write(dir.path(), "in.nc");
    let config = ReaderConfig::default()
        .with_window(TimeWindow::parse(Some("2010-01-02"), Some("2010-01-03")).unwrap())
        .with_bbox(Some(BoundingBox::new(31.0, 32.0, -99.0, -98.5).unwrap()));

    let field = read_field(&path, &config).unwrap();
    assert_eq!(field.values().dim(), (2, 2, 1));
    assert_eq!(field.coords(), &GridCoords::new(vec![31.0, 32.0], vec![-99.0]));
    // t = 1, lat = 1, lon = 1 in the full grid.
    assert_relative_eq!(field.values()[[0, 0, 0]], 1.7, epsilon = 1e-12);
}

#[test]
fn window_outside_data_is_empty_selection() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(3, 1, 1).write(dir.path(), "in.nc");
    let config = ReaderConfig::default()
        .with_window(TimeWindow::parse(Some("2030-01-01"), None).unwrap());
    let err = read_field(&path, &config).unwrap_err();
    assert!(matches!(err, IoError::Grid(GridError::EmptySelection { .. })));
}

#[test]
fn fill_and_missing_values_become_nan() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(2, 1, 2)
        .with_value(0, -999.0)
        .with_value(3, 1.0e20)
        .with_fill_value(-999.0)
        .with_missing_value(1.0e20)
        .write(dir.path(), "in.nc");

    let field = read_field(&path, &ReaderConfig::default()).unwrap();
    assert!(field.values()[[0, 0, 0]].is_nan());
    assert!(field.values()[[1, 0, 1]].is_nan());
    assert_relative_eq!(field.values()[[0, 0, 1]], 0.1, epsilon = 1e-12);
}

#[test]
fn latitude_alias_and_hourly_units() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(3, 2, 1)
        .with_lat_name("latitude")
        .with_time(vec![0.0, 6.0, 12.0], "hours since 2015-05-01 00:00:00")
        .with_calendar("gregorian")
        .write(dir.path(), "in.nc");

    let field = read_field(&path, &ReaderConfig::default()).unwrap();
    assert_eq!(field.coords().n_lat(), 2);
    assert_eq!(field.times()[2].to_string(), "2015-05-01 12:00:00");
}

#[test]
fn non_gregorian_calendar_rejected() {
    let dir = tempdir().unwrap();
    let path = FixtureBuilder::new(2, 1, 1)
        .with_calendar("noleap")
        .write(dir.path(), "in.nc");
    let err = read_field(&path, &ReaderConfig::default()).unwrap_err();
    assert!(matches!(err, IoError::InvalidTime { .. }), "got {err:?}");
}

#[test]
fn multi_file_concatenates_and_skips_outside_window() {
    let dir = tempdir().unwrap();
    let a = FixtureBuilder::new(3, 1, 2).write(dir.path(), "a.nc");
    let b = FixtureBuilder::new(2, 1, 2)
        .with_time(vec![3.0, 4.0], "days since 2010-01-01")
        .write(dir.path(), "b.nc");
    let c = FixtureBuilder::new(1, 1, 2)
        .with_time(vec![0.0], "days since 2020-01-01")
        .write(dir.path(), "c.nc");

    let config = ReaderConfig::default()
        .with_window(TimeWindow::parse(Some("2010-01-02"), Some("2019-12-31")).unwrap());
    let field = read_field_multi(&[a, b, c], &config).unwrap();
    assert_eq!(field.n_times(), 4);
    assert_eq!(field.times()[0].to_string(), "2010-01-02 00:00:00");
    assert_eq!(field.times()[3].to_string(), "2010-01-05 00:00:00");
}

#[test]
fn multi_file_overlap_rejected() {
    let dir = tempdir().unwrap();
    let a = FixtureBuilder::new(3, 1, 1).write(dir.path(), "a.nc");
    let b = FixtureBuilder::new(3, 1, 1).write(dir.path(), "b.nc");
    let err = read_field_multi(&[a, b], &ReaderConfig::default()).unwrap_err();
    assert!(matches!(err, IoError::Grid(GridError::NonMonotonicTime { .. })));
}

// ---------------------------------------------------------------------------
// Parameter grids
// ---------------------------------------------------------------------------

#[test]
fn parameter_fields_round_trip_with_bbox() {
    let dir = tempdir().unwrap();
    let coords = GridCoords::new(vec![30.0, 31.0], vec![-100.0, -99.0, -98.0]);
    let shape = array![[0.5, 0.0, 0.7], [0.2, 0.3, 0.4]];
    let scale = array![[2.0, 0.0, 1.5], [1.0, 3.0, 4.0]];
    let encoding = EncodingConfig::default().with_dtype(StorageDtype::Float64);
    let shape_path = dir.path().join("shape.nc");
    let scale_path = dir.path().join("scale.nc");
    write_parameter_field(&shape_path, "shape", &coords, shape.view(), &encoding).unwrap();
    write_parameter_field(&scale_path, "scale", &coords, scale.view(), &encoding).unwrap();

    let bbox = BoundingBox::new(30.0, 31.0, -99.5, -97.0).unwrap();
    let config = ReaderConfig::default().with_bbox(Some(bbox));
    let expected = GridCoords::new(vec![30.0, 31.0], vec![-99.0, -98.0]);
    let grid = read_parameter_grid(
        &ParameterFiles::new(&shape_path, &scale_path),
        &config,
        &expected,
    )
    .unwrap();

    assert_eq!(grid.dim(), (2, 2));
    assert_eq!(grid.shape()[[0, 1]], 0.7);
    assert_eq!(grid.scale()[[1, 0]], 3.0);
    assert_eq!(grid.n_valid(), 3);
}

#[test]
fn parameter_grid_mismatch_rejected() {
    let dir = tempdir().unwrap();
    let coords = GridCoords::new(vec![30.0], vec![-100.0, -99.0]);
    let values = array![[0.5, 0.5]];
    let path = dir.path().join("p.nc");
    write_parameter_field(&path, "shape", &coords, values.view(), &EncodingConfig::default())
        .unwrap();
    let mut files = ParameterFiles::new(&path, &path);
    files.scale_var = "shape".to_string();

    let other = GridCoords::new(vec![30.0], vec![-100.0, -98.0]);
    let err = read_parameter_grid(&files, &ReaderConfig::default(), &other).unwrap_err();
    assert!(matches!(err, IoError::Grid(GridError::CoordinateMismatch { .. })));
}
