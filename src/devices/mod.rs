
// Currently the only device supported here is the Rigol MSO5000 series.  Other Rigol scopes share most of the
// :WAVeform subsystem, so they would most likely end up as siblings reusing its acquisition and waveform modules

pub mod mso5000;
