pub mod interpolation {
    pub mod interpolationerror;
    pub mod interpolation;
    pub mod interpolationfactory;
}

pub mod conformance {
    pub mod comparison;
    pub mod samples;
    pub mod verificationreport;
    pub mod conformanceconfig;
    pub mod conformancesuite;
    pub mod conformancemacro;
}

pub mod math {
    pub mod curve {
        pub mod nonparametriccurve {
            pub mod nonparametriccurve;
            pub mod piecewisepolynomial;
            pub mod lagrangepolynomial;
        }
    }
}
