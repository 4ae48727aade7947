//! Shared fixtures for the integration tests.

use std::fs;
use std::path::{Path, PathBuf};

/// A complete FMS `.par` file for a 200 g class model.
pub const SAMPLE_PAR: &str = "\
3.5      2:power(N)        max thrust
0.35     3:rudder(rad)     rudder travel
0.35     4:elevator(rad)   elevator travel
0.30     5:aileron(rad)    aileron travel
4.8      8:clalpha(1/rad)  lift curve slope
0.02     10:cf(-)          friction coefficient
0.03     11:cdb(-)         base drag
1.1      12:clmax(-)       max lift coefficient
-0.05    14:cm(-)          pitching moment
0.905    16:span(m)        wingspan
0.114    17:chord(m)       mean chord
0.2      19:mass(kg)       total mass
0.005    20:ixx(kgm2)      roll inertia
0.0094   21:iyy(kgm2)      pitch inertia
0.012    22:izz(kgm2)      yaw inertia
0.012    23:harea(m2)      horizontal tail area
0.008    24:varea(m2)      vertical tail area
0.35     25:tailarm(m)     tail arm
";

pub fn write_par(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, SAMPLE_PAR).unwrap();
    path
}

fn write_sheet(dir: &Path, name: &str, body: &str) {
    fs::write(
        dir.join(format!("{name}.csv")),
        format!("VarName,Value,Unit,Required,Note\n{body}"),
    )
    .unwrap();
}

/// A workbook export covering every table the converter reads.
pub fn write_workbook(dir: &Path) {
    write_sheet(
        dir,
        "T_01_fileheader",
        "fileheader/name,TestModel,,YES,\nfileheader/version,2.0,,,\n",
    );
    write_sheet(
        dir,
        "T_02_metrics",
        "metrics/wing_area,103000,mm2,YES,\n\
         metrics/wing_span,905,mm,YES,\n\
         metrics/chord_avg,114,mm,YES,\n",
    );
    write_sheet(
        dir,
        "T_03_mass_balance",
        "mass/empty_weight,200,g,YES,\n\
         mass/I/ixx,0.005,kgm2,,\n\
         mass/I/iyy,0.0094,kgm2,,\n\
         mass/I/izz,0.012,kgm2,,\n\
         mass/CG/x,140,mm,,\n\
         mass/CG/y,0,mm,,\n\
         mass/CG/z,0,mm,,\n",
    );
    write_sheet(
        dir,
        "T_05_propulsion",
        "prop/max_thrust,3.5,N,,\n",
    );
    fs::write(
        dir.join("T_05a_prop_static_thrust_map.csv"),
        "rpm,thrust_N\n0,0\n5000,1.2\n10000,3.5\n",
    )
    .unwrap();
    write_sheet(
        dir,
        "T_06_aerodynamics",
        "aero/CL0,0.25,,,\n\
         aero/CLalpha,4.8,1/rad,,\n\
         aero/CD0,0.028,,,\n\
         aero/K,0.08,,,\n\
         aero/Cm0,0.0,,,\n\
         aero/Cmalpha,-0.5,1/rad,,\n\
         aero/Cmq,-12.0,,,\n",
    );
    write_sheet(
        dir,
        "T_08_output",
        "output/file_name,flight.csv,,,\n\
         output/rate_hz,20,,,\n\
         output/properties,velocities/vt-fps;aero/alpha-deg,,,\n",
    );
}
